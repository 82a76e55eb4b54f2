//! # Error Handling for Keycloakify FTL
//!
//! This module defines the error type shared by every stage of the theme
//! build: configuration loading, inline code rewriting, FTL generation and
//! output writing. The `thiserror` crate is used to derive the `Display` and
//! `Error` implementations.
//!
//! Two families of failure are distinguished:
//!
//! - **Recoverable input errors** (`ConfigError`, `RewriteError`,
//!   `InvalidPageId`) point at something the user can fix in their build.
//! - **Invariant violations** (`InvariantViolation`) indicate a packaging or
//!   internal-consistency defect and are never expected at runtime.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the Keycloakify FTL library.
///
/// This type alias simplifies function signatures by defining a result type that always uses `KeycloakifyError` as the error variant.
pub type Result<T> = std::result::Result<T, KeycloakifyError>;

/// The main error type for Keycloakify FTL, encompassing all potential error cases.
#[derive(Error, Debug)]
pub enum KeycloakifyError {
    /// Error related to configuration initialisation or validation.
    ///
    /// This error occurs when there is a problem with configuration files or values.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// Inline JavaScript or CSS could not be parsed for import rewriting.
    ///
    /// Rewriting is all-or-nothing per block: when this is returned no
    /// partially rewritten code has been produced.
    #[error("Failed to rewrite imports in inline {language}: {message}.")]
    RewriteError {
        /// The language of the offending block (`javascript` or `css`).
        language: &'static str,
        /// Description of the parse failure.
        message: String,
    },

    /// An internal invariant did not hold.
    ///
    /// Raised for a missing template marker, a placeholder collision, or a
    /// document shape the transformer never expects.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A page identifier contains characters that cannot appear in a Keycloak page id.
    #[error("Invalid page id `{0}`")]
    InvalidPageId(String),

    /// Error in output generation.
    ///
    /// This variant represents issues that arise during the creation of output files, particularly if there is a problem writing to the output path.
    #[error("Output generation error: {message} at {path:?}.")]
    OutputGenerationError {
        /// Description of the output generation error.
        message: String,
        /// Path associated with the error.
        path: PathBuf,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error related to template rendering.
    ///
    /// This variant is used when rendering templates fails, either due to syntax issues or missing templates.
    #[error(
        "Template rendering error: {message} in template `{template}`."
    )]
    TemplateRenderingError {
        /// Description of the template rendering error.
        message: String,
        /// The specific template file or identifier associated with the error.
        template: String,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered during file operations.
    ///
    /// This variant is used for errors encountered while reading or writing files.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// General internal error.
    ///
    /// This variant represents miscellaneous errors within the library that
    /// do not fall under any specific category.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for KeycloakifyError {
    /// Converts a standard IO error into a `KeycloakifyError::IOError`.
    ///
    /// The path is left empty; prefer [`KeycloakifyError::io_error`] when
    /// the path is known.
    fn from(source: std::io::Error) -> Self {
        KeycloakifyError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl KeycloakifyError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        KeycloakifyError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `RewriteError` for the given language.
    pub fn rewrite_error<S: Into<String>>(
        language: &'static str,
        message: S,
    ) -> Self {
        KeycloakifyError::RewriteError {
            language,
            message: message.into(),
        }
    }

    /// Creates an `InvariantViolation` with a custom message.
    pub fn invariant_violation<S: Into<String>>(message: S) -> Self {
        KeycloakifyError::InvariantViolation(message.into())
    }

    /// Creates an `OutputGenerationError` with a specific message, path, and optional source.
    ///
    /// # Parameters
    /// - `message`: A description of the output generation error.
    /// - `path`: The path associated with the error.
    /// - `source`: An optional source error providing additional context.
    pub fn output_generation_error<S: Into<String>>(
        message: S,
        path: PathBuf,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        KeycloakifyError::OutputGenerationError {
            message: message.into(),
            path,
            source,
        }
    }

    /// Creates a `TemplateRenderingError` with a message, template name, and optional source.
    pub fn template_rendering_error<S: Into<String>>(
        message: S,
        template: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        KeycloakifyError::TemplateRenderingError {
            message: message.into(),
            template,
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        KeycloakifyError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        KeycloakifyError::InternalError(message.into())
    }

    /// Returns `true` when the error reports an internal defect rather
    /// than a problem with the user's input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, KeycloakifyError::InvariantViolation(_))
    }
}
