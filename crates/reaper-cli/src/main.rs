//! Binary entrypoint for the Reaper CLI.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = reaper_cli::run().await;
    process::exit(exit_code);
}
