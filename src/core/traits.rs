//! # Core Traits Module
//!
//! The seams of the theme build. Each stage is expressed as a trait so the
//! pipeline can be assembled from interchangeable parts and tested in
//! isolation.
//!
//! ## Key Traits
//!
//! - [`ImportRewriter`]: rewrites asset references inside one block of inline code
//! - [`TemplateRenderer`]: renders a named template against a JSON context
//! - [`Generator`]: writes generated content to disk

use std::path::Path;

use crate::core::error::Result;
use serde_json::Value as JsonValue;

/// Rewrites the asset references found in one block of inline code.
///
/// Implementations are all-or-nothing: either every reference in the block
/// is rewritten, or an error is returned and the block is left untouched.
pub trait ImportRewriter: Send + Sync + std::fmt::Debug {
    /// The language handled by this rewriter, used in error messages.
    fn language(&self) -> &'static str;

    /// Rewrites the references in `code`.
    ///
    /// # Arguments
    ///
    /// * `code` - The source text of one inline block
    ///
    /// # Returns
    ///
    /// The rewritten source, or a `RewriteError` if `code` cannot be parsed.
    fn rewrite(&self, code: &str) -> Result<String>;
}

/// Trait for template rendering implementations.
pub trait TemplateRenderer: Send + Sync + std::fmt::Debug {
    /// Renders a template with the specified context.
    ///
    /// # Arguments
    /// * `template` - The template name.
    /// * `context` - The context data for rendering the template.
    fn render(
        &self,
        template: &str,
        context: &JsonValue,
    ) -> Result<String>;
}

/// Trait for implementing output generation.
pub trait Generator: Send + Sync + std::fmt::Debug {
    /// Generates output from the given content.
    ///
    /// # Arguments
    ///
    /// * `content` - The content to generate output from
    /// * `path` - The path where the output should be written
    fn generate(&self, content: &str, path: &Path) -> Result<()>;

    /// Checks that `path` can receive output, preparing it if needed.
    fn validate(&self, path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_import_rewriter_implementation() {
        #[derive(Debug)]
        struct UppercaseRewriter;

        impl ImportRewriter for UppercaseRewriter {
            fn language(&self) -> &'static str {
                "text"
            }

            fn rewrite(&self, code: &str) -> Result<String> {
                Ok(code.to_uppercase())
            }
        }

        let rewriter = UppercaseRewriter;
        assert_eq!(rewriter.rewrite("import").unwrap(), "IMPORT");
        assert_eq!(rewriter.language(), "text");
    }

    #[test]
    fn test_generator_implementation() {
        #[derive(Debug)]
        struct TestGenerator;

        impl Generator for TestGenerator {
            fn generate(&self, content: &str, path: &Path) -> Result<()> {
                fs::write(path, content)?;
                Ok(())
            }

            fn validate(&self, path: &Path) -> Result<()> {
                if let Some(parent) = path.parent() {
                    if !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                Ok(())
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("login.ftl");
        let generator = TestGenerator;

        generator.validate(&output_path).unwrap();
        generator.generate("<html></html>", &output_path).unwrap();
        assert_eq!(
            fs::read_to_string(output_path).unwrap(),
            "<html></html>"
        );
    }
}
