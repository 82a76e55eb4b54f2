//! # Maven Stack Files
//!
//! A Keycloak theme is distributed as a jar. This module writes the files
//! Maven needs to package the generated theme: the `pom.xml` descriptor and
//! the `META-INF/keycloak-themes.json` manifest listing the theme.

use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::core::config::{PackageInfo, ThemeType};
use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::TemplateRenderer;
use crate::process::write_content;
use crate::template::POM_TEMPLATE;

/// Path of the theme manifest, relative to the building directory.
pub const THEME_MANIFEST_PATH: &str =
    "src/main/resources/META-INF/keycloak-themes.json";

#[derive(Debug, Serialize)]
struct ThemeManifest<'a> {
    themes: Vec<ThemeManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ThemeManifestEntry<'a> {
    name: &'a str,
    types: &'a [ThemeType],
}

/// Derives the Maven group id from the package homepage.
///
/// The host labels of the homepage are reversed (`https://app.example.com`
/// gives `com.example.app`). Without a usable homepage a placeholder based
/// on the package name is used. `.keycloak` is always appended.
///
/// ```
/// use keycloakify_ftl::core::config::PackageInfo;
/// use keycloakify_ftl::generators::stack::group_id;
///
/// let package = PackageInfo {
///     name: "app".to_string(),
///     version: "1.0.0".to_string(),
///     homepage: Some("https://app.example.com/docs".to_string()),
/// };
/// assert_eq!(group_id(&package), "com.example.app.keycloak");
/// ```
pub fn group_id(package: &PackageInfo) -> String {
    let reversed_host = package
        .homepage
        .as_deref()
        .and_then(|homepage| Url::parse(homepage).ok())
        .and_then(|url| {
            url.host_str().map(|host| {
                host.split('.').rev().collect::<Vec<_>>().join(".")
            })
        });

    let base = reversed_host.unwrap_or_else(|| {
        format!(
            "there.was.no.homepage.field.in.the.package.json.{}",
            package.name
        )
    });
    format!("{}.keycloak", base)
}

/// Maven artifact id of the theme jar.
pub fn artifact_id(package: &PackageInfo) -> String {
    format!("{}-keycloak-theme", package.name)
}

/// Writes `pom.xml` and the theme manifest into `building_dir`.
///
/// Returns the path of the jar Maven will produce.
pub fn generate_stack_files(
    package: &PackageInfo,
    theme_name: &str,
    theme_types: &[ThemeType],
    building_dir: &Path,
    renderer: &dyn TemplateRenderer,
) -> Result<PathBuf> {
    let pom = renderer.render(
        POM_TEMPLATE,
        &json!({
            "group_id": group_id(package),
            "artifact_id": artifact_id(package),
            "version": package.version,
        }),
    )?;
    write_content(&building_dir.join("pom.xml"), &pom)?;

    let manifest = ThemeManifest {
        themes: vec![ThemeManifestEntry {
            name: theme_name,
            types: theme_types,
        }],
    };
    let manifest = serde_json::to_string_pretty(&manifest).map_err(|e| {
        KeycloakifyError::output_generation_error(
            "Failed to serialize theme manifest",
            building_dir.join(THEME_MANIFEST_PATH),
            Some(Box::new(e)),
        )
    })?;
    write_content(&building_dir.join(THEME_MANIFEST_PATH), &manifest)?;

    let jar_path = building_dir
        .join("target")
        .join(format!("{}-{}.jar", package.name, package.version));
    info!("Maven project ready, expecting {:?}", jar_path);
    Ok(jar_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::HandlebarsRenderer;
    use std::fs;
    use tempfile::TempDir;

    fn package(homepage: Option<&str>) -> PackageInfo {
        PackageInfo {
            name: "shop".to_string(),
            version: "3.1.0".to_string(),
            homepage: homepage.map(String::from),
        }
    }

    #[test]
    fn test_group_id() {
        assert_eq!(
            group_id(&package(Some("https://shop.acme.io"))),
            "io.acme.shop.keycloak"
        );
        assert_eq!(
            group_id(&package(Some("http://localhost:8080/"))),
            "localhost.keycloak"
        );
        assert_eq!(
            group_id(&package(None)),
            "there.was.no.homepage.field.in.the.package.json.shop.keycloak"
        );
        assert_eq!(
            group_id(&package(Some("not a url"))),
            "there.was.no.homepage.field.in.the.package.json.shop.keycloak"
        );
    }

    #[test]
    fn test_generate_stack_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let renderer = HandlebarsRenderer::new()?;

        let jar_path = generate_stack_files(
            &package(Some("https://shop.acme.io")),
            "shop",
            &[ThemeType::Login, ThemeType::Account],
            temp_dir.path(),
            &renderer,
        )?;

        assert_eq!(jar_path, temp_dir.path().join("target/shop-3.1.0.jar"));

        let pom = fs::read_to_string(temp_dir.path().join("pom.xml"))?;
        assert!(pom.contains("<groupId>io.acme.shop.keycloak</groupId>"));
        assert!(pom.contains("<artifactId>shop-keycloak-theme</artifactId>"));
        assert!(pom.contains("<version>3.1.0</version>"));

        let manifest = fs::read_to_string(
            temp_dir.path().join(THEME_MANIFEST_PATH),
        )?;
        assert_eq!(
            manifest,
            "{\n  \"themes\": [\n    {\n      \"name\": \"shop\",\n      \"types\": [\n        \"login\",\n        \"account\"\n      ]\n    }\n  ]\n}"
        );
        Ok(())
    }
}
