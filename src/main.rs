//! swag-from-source - Command-line tool for documenting Gin handlers with swag comments.
//!
//! The tool reads the router, request-type and handler sources of a Go service and writes a
//! swag comment block above every handler method that does not have one yet.
//!
//! # Usage
//!
//! ```bash
//! swag-from-source [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Document handlers using the default project layout:
//! ```bash
//! swag-from-source
//! ```
//!
//! Preview a run against a custom layout with a JSON report:
//! ```bash
//! swag-from-source --handler-dir api/handlers --router api/routes.go --types 'api/dto/*.go' --dry-run --report json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swag-from-source -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swag_from_source::cli;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can configure the logger
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("swag-from-source starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Swag comment generation completed successfully");

    Ok(())
}
