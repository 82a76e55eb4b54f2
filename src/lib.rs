// Copyright © 2024 Keycloakify FTL. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Keycloakify FTL Library
//!
//! Keycloakify FTL turns the `index.html` of a single-page application
//! build into the FreeMarker (`.ftl`) templates a Keycloak theme is made
//! of. Every asset reference is moved under Keycloak's resources path, the
//! Keycloak request context is injected as a global JavaScript object, and
//! the Maven files needed to package the theme as a jar are written next to
//! the templates.
//!
//! For more information, visit the [Keycloakify FTL documentation](https://docs.rs/keycloakify-ftl).

#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/keycloakify-ftl")]
#![crate_name = "keycloakify_ftl"]
#![crate_type = "lib"]

use std::path::{Path, PathBuf};

use log::info;

use crate::core::config::{Config, ThemeConstants, ThemeType};
use crate::core::traits::Generator;
use crate::generators::ftl::{theme_dir, FtlFileGenerator};
use crate::generators::stack::generate_stack_files;
use crate::kc_context::KcContextTemplate;
use crate::process::read_content;
use crate::template::HandlebarsRenderer;

pub use crate::core::error::{KeycloakifyError, Result};
pub use crate::ftl::{FtlCode, FtlGenerator, FtlGeneratorParams, Skeleton};

/// Module containing core utilities, such as configuration and error handling.
pub mod core {
    /// Handles configuration of a theme build.
    pub mod config;
    /// Contains error types and handling for Keycloakify FTL.
    pub mod error;
    /// The seams of the build pipeline.
    pub mod traits;
}

/// Provides command-line interface utilities.
pub mod cli;

/// Arena-backed HTML document tree.
pub mod dom;

/// HTML to FreeMarker transformation.
pub mod ftl;

/// Provides output generation utilities.
pub mod generators;

/// Keycloak context injection code.
pub mod kc_context;

/// File reading and writing helpers.
pub mod process;

/// Asset reference rewriting for inline JavaScript and CSS.
pub mod replacers;

/// Provides template rendering utilities.
pub mod template;

/// Version of this crate, recorded in every generated page.
pub const KEYCLOAKIFY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Summary of a completed theme build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Every page template written, in generation order.
    pub ftl_files: Vec<PathBuf>,
    /// The jar Maven will produce from the building directory.
    pub jar_path: PathBuf,
}

/// A complete theme build: page templates for every configured theme type,
/// then the Maven stack files.
///
/// ```rust,no_run
/// use keycloakify_ftl::core::config::ConfigBuilder;
/// use keycloakify_ftl::ThemeBuild;
///
/// let config = ConfigBuilder::new()
///     .with_file("keycloakify.toml")
///     .build()
///     .unwrap();
/// let report = ThemeBuild::new(config).run().unwrap();
/// println!("{} pages, jar at {:?}", report.ftl_files.len(), report.jar_path);
/// ```
#[derive(Debug, Clone)]
pub struct ThemeBuild {
    config: Config,
    constants: ThemeConstants,
    kc_context_template: Option<PathBuf>,
    template_dir: Option<PathBuf>,
}

impl ThemeBuild {
    /// Creates a build with the default [`ThemeConstants`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            constants: ThemeConstants::default(),
            kc_context_template: None,
            template_dir: None,
        }
    }

    /// Replaces the shared names.
    pub fn with_constants(mut self, constants: ThemeConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Reads the context-injection template from `path` instead of the
    /// embedded one.
    pub fn with_kc_context_template<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.kc_context_template = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the embedded Handlebars templates with `*.hbs` files.
    pub fn with_template_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// The build configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn load_kc_context_template(&self) -> Result<KcContextTemplate> {
        match &self.kc_context_template {
            Some(path) => KcContextTemplate::load(path),
            None => KcContextTemplate::embedded(),
        }
    }

    /// Transforms `index_html_code` into the page generator of one theme type.
    pub fn generator(
        &self,
        theme_type: ThemeType,
        index_html_code: &str,
    ) -> Result<FtlGenerator> {
        let template = self.load_kc_context_template()?;
        self.generator_with(&template, theme_type, index_html_code)
    }

    fn generator_with(
        &self,
        template: &KcContextTemplate,
        theme_type: ThemeType,
        index_html_code: &str,
    ) -> Result<FtlGenerator> {
        FtlGenerator::new(&FtlGeneratorParams {
            theme_name: &self.config.theme.name,
            index_html_code,
            css_globals: &self.config.theme.css_globals,
            build_options: &self.config.build,
            constants: &self.constants,
            keycloakify_version: KEYCLOAKIFY_VERSION,
            theme_type,
            field_names: &self.config.theme.field_names,
            kc_context_template: template,
        })
    }

    /// Runs the build.
    ///
    /// Reads the SPA's `index.html` once, writes every page of every theme
    /// type under the building directory, then writes `pom.xml` and the
    /// theme manifest.
    pub fn run(&self) -> Result<BuildReport> {
        let options = &self.config.build;
        let theme = &self.config.theme;

        let index_html_path = options.index_html_path();
        info!("Reading {:?}", index_html_path);
        let index_html_code = read_content(&index_html_path)?;

        let template = self.load_kc_context_template()?;
        let writer = FtlFileGenerator::new();
        let mut ftl_files = Vec::new();

        for &theme_type in &theme.types {
            let generator =
                self.generator_with(&template, theme_type, &index_html_code)?;
            let dir = theme_dir(
                &options.keycloak_theme_building_dir,
                &theme.name,
                theme_type,
            );

            for page_id in theme.page_ids_for(theme_type) {
                let ftl = generator.generate(&page_id)?;
                let path = dir.join(ftl.page_id());
                writer.generate(ftl.as_str(), &path)?;
                ftl_files.push(path);
            }
            info!(
                "Generated {} theme '{}' in {:?}",
                theme_type, theme.name, dir
            );
        }

        let mut renderer = HandlebarsRenderer::new()?;
        if let Some(dir) = &self.template_dir {
            renderer = renderer.with_template_dir(dir)?;
        }
        let jar_path = generate_stack_files(
            &self.config.package,
            &theme.name,
            &theme.types,
            &options.keycloak_theme_building_dir,
            &renderer,
        )?;

        Ok(BuildReport {
            ftl_files,
            jar_path,
        })
    }
}
