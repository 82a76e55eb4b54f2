// Copyright © 2024 Keycloakify FTL. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for Keycloakify FTL
//!
//! This module provides the command-line interface: argument parsing and
//! dispatch to the library.
//!
//! # Examples
//!
//! Parsing a `build` command with a configuration override:
//!
//! ```
//! use keycloakify_ftl::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "keycloakify-ftl",
//!     "build",
//!     "--set",
//!     "build.bundler=webpack",
//! ]);
//!
//! let build_cmd = matches.subcommand_matches("build").unwrap();
//! assert_eq!(
//!     build_cmd.get_one::<String>("set").unwrap(),
//!     "build.bundler=webpack"
//! );
//! ```

use crate::core::config::{ConfigBuilder, ThemeType};
use crate::core::error::{KeycloakifyError, Result};
use crate::ThemeBuild;
use crate::process::read_content;
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::path::PathBuf;

/// The current version of Keycloakify FTL, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file read by `build`.
pub const DEFAULT_CONFIG_FILE: &str = "keycloakify.toml";

/// Prefix of the environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "KEYCLOAKIFY_";

/// Builds and configures the command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("keycloakify-ftl")
        .author("Keycloakify FTL Contributors")
        .about("Turns a single-page application build into a Keycloak theme.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv)")
                .action(ArgAction::Count)
                .global(true)
        )
        .subcommand(
            Command::new("build")
                .about("Generate every page of the theme and the Maven files")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Configuration file")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_CONFIG_FILE)
                )
                .arg(
                    Arg::new("set")
                        .short('s')
                        .long("set")
                        .help("Override a configuration value (section.key=value)")
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append)
                )
                .arg(
                    Arg::new("kc-context-template")
                        .long("kc-context-template")
                        .help("Context injection template replacing the built-in one")
                        .value_parser(value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("template-dir")
                        .long("template-dir")
                        .help("Directory of *.hbs templates overriding the built-in ones")
                        .value_parser(value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("ftl")
                .about("Print the FreeMarker template of one page")
                .arg(
                    Arg::new("index")
                        .short('i')
                        .long("index")
                        .help("The SPA's built index.html")
                        .value_parser(value_parser!(PathBuf))
                        .required(true)
                )
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .help("Page id")
                        .default_value("login.ftl")
                )
                .arg(
                    Arg::new("theme-name")
                        .short('n')
                        .long("theme-name")
                        .help("Theme name")
                        .default_value("keycloakify")
                )
                .arg(
                    Arg::new("theme-type")
                        .short('t')
                        .long("theme-type")
                        .help("Theme type")
                        .value_parser(["login", "account"])
                        .default_value("login")
                )
                .arg(
                    Arg::new("url-pathname")
                        .long("url-pathname")
                        .help("URL path the SPA was built for")
                        .default_value("/")
                )
                .arg(
                    Arg::new("bundler")
                        .long("bundler")
                        .help("Bundler that produced the build")
                        .value_parser(["vite", "webpack"])
                        .default_value("vite")
                )
                .arg(
                    Arg::new("field-name")
                        .long("field-name")
                        .help("Form field name exposed to client code")
                        .action(ArgAction::Append)
                )
        )
        .after_help(
            "\x1b[1;4mConfiguration:\x1b[0m\n\n  Values are read from keycloakify.toml, then from \
             KEYCLOAKIFY_<SECTION>__<KEY> environment variables, then from --set.\n\n\
             \x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0)."
        )
}

/// Executes the parsed command line.
///
/// # Returns
/// * `Result<()>` - Indicates success, or an error if execution fails.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("build", sub_matches)) => run_build(sub_matches),
        Some(("ftl", sub_matches)) => run_ftl(sub_matches),
        _ => Err(KeycloakifyError::internal_error("Unknown command")),
    }
}

/// Splits a `section.key=value` override.
///
/// ```
/// use keycloakify_ftl::cli::parse_override;
///
/// assert_eq!(
///     parse_override("theme.name=acme").unwrap(),
///     ("theme.name".to_string(), "acme".to_string())
/// );
/// assert!(parse_override("theme.name").is_err());
/// ```
pub fn parse_override(value: &str) -> Result<(String, String)> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(KeycloakifyError::config_error(
            format!("Invalid override '{}', expected section.key=value", value),
            None,
        )),
    }
}

fn required<'m>(matches: &'m ArgMatches, id: &str) -> Result<&'m String> {
    matches.get_one::<String>(id).ok_or_else(|| {
        KeycloakifyError::internal_error(format!("Missing argument '{}'", id))
    })
}

fn run_build(matches: &ArgMatches) -> Result<()> {
    let mut builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);

    if let Some(config_file) = matches.get_one::<PathBuf>("config") {
        let is_default =
            matches.value_source("config") == Some(ValueSource::DefaultValue);
        if config_file.exists() || !is_default {
            builder = builder.with_file(config_file);
        } else {
            info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
        }
    }

    if let Some(overrides) = matches.get_many::<String>("set") {
        for value in overrides {
            let (key, value) = parse_override(value)?;
            builder = builder.with_override(key, value);
        }
    }

    let mut theme_build = ThemeBuild::new(builder.build()?);
    if let Some(path) = matches.get_one::<PathBuf>("kc-context-template") {
        theme_build = theme_build.with_kc_context_template(path);
    }
    if let Some(path) = matches.get_one::<PathBuf>("template-dir") {
        theme_build = theme_build.with_template_dir(path);
    }

    let report = theme_build.run()?;
    info!(
        "Wrote {} page(s); run `mvn package` to produce {:?}",
        report.ftl_files.len(),
        report.jar_path
    );
    Ok(())
}

fn run_ftl(matches: &ArgMatches) -> Result<()> {
    let index = matches.get_one::<PathBuf>("index").ok_or_else(|| {
        KeycloakifyError::internal_error("Missing argument 'index'")
    })?;
    let theme_name = required(matches, "theme-name")?;
    let theme_type: ThemeType = required(matches, "theme-type")?.parse()?;
    let field_names = matches
        .get_many::<String>("field-name")
        .map(|names| names.cloned().collect::<Vec<_>>().join(","))
        .unwrap_or_default();

    let config = ConfigBuilder::new()
        .with_override("package.name", theme_name.as_str())
        .with_override("theme.name", theme_name.as_str())
        .with_override("theme.types", theme_type.as_str())
        .with_override("theme.field_names", field_names)
        .with_override(
            "build.url_pathname",
            required(matches, "url-pathname")?.as_str(),
        )
        .with_override("build.bundler", required(matches, "bundler")?.as_str())
        .build()?;

    let index_html_code = read_content(index)?;
    let page = ThemeBuild::new(config)
        .generator(theme_type, &index_html_code)?
        .generate(required(matches, "page")?)?;

    println!("{}", page.as_str());
    Ok(())
}
