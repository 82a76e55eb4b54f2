//! # Template Rendering Module
//!
//! Handlebars rendering for the files that accompany a theme, such as the
//! Maven descriptor. Templates ship embedded in the crate; a directory of
//! `*.hbs` files can override them by name (`pom.xml.hbs` overrides
//! `pom.xml`).

use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::TemplateRenderer;
use handlebars::Handlebars;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

/// Name of the Maven descriptor template.
pub const POM_TEMPLATE: &str = "pom.xml";

const EMBEDDED_TEMPLATES: &[(&str, &str)] =
    &[(POM_TEMPLATE, include_str!("../templates/pom.xml.hbs"))];

/// Renderer for Handlebars templates.
#[derive(Clone)]
pub struct HandlebarsRenderer {
    engine: Arc<RwLock<Handlebars<'static>>>,
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("templates", &self.engine.read().get_templates().keys())
            .finish()
    }
}

impl HandlebarsRenderer {
    /// Creates a renderer with the embedded templates registered.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::html_escape);

        let renderer = Self {
            engine: Arc::new(RwLock::new(handlebars)),
        };

        for (name, source) in EMBEDDED_TEMPLATES {
            renderer.register_template(name, source)?;
        }
        Ok(renderer)
    }

    /// Registers every `*.hbs` file of `dir`, replacing embedded templates
    /// with the same name.
    pub fn with_template_dir(self, dir: &Path) -> Result<Self> {
        self.load_templates(dir)?;
        Ok(self)
    }

    /// Validates and registers a template.
    pub fn register_template(&self, name: &str, source: &str) -> Result<()> {
        validate_template(name, source)?;

        self.engine
            .write()
            .register_template_string(name, source)
            .map_err(|e| {
                KeycloakifyError::template_rendering_error(
                    format!("Failed to register template: {}", e),
                    name.to_string(),
                    Some(Box::new(e)),
                )
            })?;

        debug!("Registered template '{}'", name);
        Ok(())
    }

    /// Loads templates from the directory, validating them.
    fn load_templates(&self, dir: &Path) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            KeycloakifyError::template_rendering_error(
                format!("Failed to read template directory: {}", e),
                dir.display().to_string(),
                Some(Box::new(e)),
            )
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| KeycloakifyError::io_error(dir.to_path_buf(), e))?
                .path();

            if !(path.is_file()
                && path.extension().and_then(|s| s.to_str()) == Some("hbs"))
            {
                continue;
            }

            let template_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    KeycloakifyError::template_rendering_error(
                        "Invalid template filename",
                        path.display().to_string(),
                        None,
                    )
                })?
                .to_string();

            let source = std::fs::read_to_string(&path)
                .map_err(|e| KeycloakifyError::io_error(path.clone(), e))?;

            self.register_template(&template_name, &source)?;
        }
        Ok(())
    }
}

/// Checks the template syntax by compiling it against an empty context.
fn validate_template(name: &str, source: &str) -> Result<()> {
    _ = Handlebars::new()
        .render_template(source, &JsonValue::Null)
        .map_err(|e| {
            KeycloakifyError::template_rendering_error(
                format!("Invalid template: {}", e),
                name.to_string(),
                Some(Box::new(e)),
            )
        })?;
    Ok(())
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        template: &str,
        context: &JsonValue,
    ) -> Result<String> {
        self.engine.read().render(template, context).map_err(|e| {
            KeycloakifyError::template_rendering_error(
                format!("Template rendering failed: {}", e),
                template.to_string(),
                Some(Box::new(e)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_pom_template() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let pom = renderer
            .render(
                POM_TEMPLATE,
                &json!({
                    "group_id": "com.example.keycloak",
                    "artifact_id": "app-keycloak-theme",
                    "version": "1.0.0",
                }),
            )
            .unwrap();

        assert!(pom.starts_with("<?xml version=\"1.0\"?>"));
        assert!(pom.contains("\t<groupId>com.example.keycloak</groupId>"));
        assert!(pom.contains("\t<name>app-keycloak-theme</name>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let pom = renderer
            .render(POM_TEMPLATE, &json!({ "version": "1<2" }))
            .unwrap();
        assert!(pom.contains("<version>1&lt;2</version>"));
    }

    #[test]
    fn test_template_dir_overrides_embedded() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pom.xml.hbs"),
            "<project>{{version}}</project>",
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let renderer = HandlebarsRenderer::new()
            .unwrap()
            .with_template_dir(temp_dir.path())
            .unwrap();
        let pom = renderer
            .render(POM_TEMPLATE, &json!({ "version": "2.0.0" }))
            .unwrap();
        assert_eq!(pom, "<project>2.0.0</project>");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let result = renderer.register_template("broken", "{{#if}}");
        assert!(matches!(
            result,
            Err(KeycloakifyError::TemplateRenderingError { .. })
        ));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("pom.xml.hbs"), "{{#each}}").unwrap();

        let result =
            HandlebarsRenderer::new().unwrap().with_template_dir(temp_dir.path());
        assert!(matches!(
            result,
            Err(KeycloakifyError::TemplateRenderingError { template, .. })
                if template == POM_TEMPLATE
        ));
    }
}
