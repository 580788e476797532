#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Operator CLI for a Cassandra Reaper repair-orchestration service.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by entity
//! - `service.rs`: the repair service capability; `client.rs` implements it over HTTP
//! - `state.rs` / `actions.rs`: local state gates and transition phrasing
//! - `bulk.rs`: best-effort sweeps across schedules and repairs
//! - `output.rs`: renderers and formatting helpers
//! - `report.rs`: progress reporting sink
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod actions;
pub(crate) mod bulk;
pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;
pub(crate) mod report;
pub(crate) mod service;
pub(crate) mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use cli::run;
