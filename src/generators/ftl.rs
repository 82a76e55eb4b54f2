//! # FTL Output
//!
//! Writes generated page templates into the theme directory layout
//! Keycloak expects:
//!
//! ```text
//! <building dir>/src/main/resources/theme/<theme name>/<theme type>/<page id>
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::config::ThemeType;
use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::Generator;

/// Returns the directory holding the pages of one theme type.
///
/// ```
/// use keycloakify_ftl::core::config::ThemeType;
/// use keycloakify_ftl::generators::ftl::theme_dir;
/// use std::path::Path;
///
/// assert_eq!(
///     theme_dir(Path::new("build_keycloak"), "acme", ThemeType::Login),
///     Path::new("build_keycloak/src/main/resources/theme/acme/login")
/// );
/// ```
pub fn theme_dir(
    building_dir: &Path,
    theme_name: &str,
    theme_type: ThemeType,
) -> PathBuf {
    building_dir
        .join("src")
        .join("main")
        .join("resources")
        .join("theme")
        .join(theme_name)
        .join(theme_type.as_str())
}

/// Writes `.ftl` files, creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtlFileGenerator;

impl FtlFileGenerator {
    /// Creates a new generator.
    pub fn new() -> Self {
        Self
    }
}

impl Generator for FtlFileGenerator {
    fn generate(&self, content: &str, path: &Path) -> Result<()> {
        self.validate(path)?;

        let file = File::create(path)
            .map_err(|e| KeycloakifyError::io_error(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(content.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| KeycloakifyError::io_error(path.to_path_buf(), e))?;

        debug!("Wrote {:?}", path);
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if path.extension().and_then(|s| s.to_str()) != Some("ftl") {
            return Err(KeycloakifyError::output_generation_error(
                "Invalid file extension - expected .ftl",
                path.to_path_buf(),
                None,
            ));
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    KeycloakifyError::io_error(parent.to_path_buf(), e)
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_into_nested_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = theme_dir(temp_dir.path(), "acme", ThemeType::Account)
            .join("account.ftl");

        FtlFileGenerator::new().generate("<html></html>", &path)?;

        assert_eq!(fs::read_to_string(&path)?, "<html></html>");
        assert!(path.ends_with("theme/acme/account/account.ftl"));
        Ok(())
    }

    #[test]
    fn test_rejects_other_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let result = FtlFileGenerator::new()
            .generate("", &temp_dir.path().join("login.html"));
        assert!(matches!(
            result,
            Err(KeycloakifyError::OutputGenerationError { .. })
        ));
        assert!(!temp_dir.path().join("login.html").exists());
    }

    #[test]
    fn test_existing_template_is_replaced() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("login.ftl");
        let generator = FtlFileGenerator::new();

        generator.generate("first", &path)?;
        generator.generate("second", &path)?;
        assert_eq!(fs::read_to_string(&path)?, "second");
        Ok(())
    }
}
