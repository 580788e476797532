#![forbid(unsafe_code)]
#![deny(
    warnings,
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Logging bootstrap shared by the Reaper tooling.
//!
//! Layout: `init.rs` (subscriber installation and formats), `error.rs`
//! (telemetry error type).

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
