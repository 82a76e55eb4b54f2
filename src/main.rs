// Copyright © 2024 Keycloakify FTL. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Keycloakify FTL CLI
//!
//! This is the main entry point for the Keycloakify FTL command-line
//! interface. It initializes the logger and runs the selected command.

use anyhow::Context;
use clap::ArgMatches;
use keycloakify_ftl::cli;
use log::{info, LevelFilter};

/// Initializes `env_logger`. `RUST_LOG` wins over `-v`.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns the library error, wrapped with the failing command.
fn run(matches: &ArgMatches) -> Result<(), anyhow::Error> {
    let command = matches.subcommand_name().unwrap_or_default();
    info!("Starting keycloakify-ftl {}...", command);

    cli::execute(matches)
        .with_context(|| format!("Failed to run `{}`", command))?;

    info!("keycloakify-ftl {} completed successfully", command);
    Ok(())
}

/// The main entry point for the Keycloakify FTL CLI.
fn main() {
    let matches = cli::build().get_matches();
    init_logger(matches.get_count("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
