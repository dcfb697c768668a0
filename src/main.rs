//! scss-bundler CLI entry point
//!
//! Parses arguments, installs logging, runs the command and renders any
//! error with its suggestion before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use scss_bundler::cli;
use scss_bundler::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
