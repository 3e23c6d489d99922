//! dil-release - Release packager for the DIL compiler.
//!
//! This binary creates DIL release trees, Debian packages and archives
//! with proper error handling and exit codes.

use dil_release::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let exit_code = cli::run().await;
    process::exit(exit_code);
}
