//! # Configuration Module
//!
//! Build configuration for a Keycloak theme build. Settings are read from a
//! TOML file (conventionally `keycloakify.toml`), then overridden by
//! environment variables and finally by programmatic overrides before being
//! validated into an immutable [`Config`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use keycloakify_ftl::core::config::{Bundler, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("keycloakify.toml")
//!     .with_env_prefix("KEYCLOAKIFY_")
//!     .with_override("build.bundler", "webpack")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.build.bundler, Bundler::Webpack);
//! ```
//!
//! ## File layout
//!
//! ```toml
//! [build]
//! bundler = "vite"
//! url_pathname = "/"
//! react_app_build_dir_path = "dist"
//!
//! [theme]
//! name = "my-theme"
//! types = ["login"]
//!
//! [package]
//! name = "my-app"
//! version = "1.2.0"
//! homepage = "https://my-app.example.com"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{KeycloakifyError, Result};

/// The bundler that produced the single-page application build.
///
/// The bundler decides which JavaScript constructs carry asset paths that
/// must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bundler {
    /// Vite (Rollup) output: assets are referenced through ES module imports.
    #[default]
    Vite,
    /// Webpack output: assets are additionally resolved through the runtime public path.
    Webpack,
}

impl FromStr for Bundler {
    type Err = KeycloakifyError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "vite" => Ok(Bundler::Vite),
            "webpack" => Ok(Bundler::Webpack),
            other => Err(KeycloakifyError::config_error(
                format!("Unknown bundler '{}'", other),
                None,
            )),
        }
    }
}

/// The kind of Keycloak theme being generated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ThemeType {
    /// The login theme (authentication flows).
    Login,
    /// The account management console theme.
    Account,
}

impl ThemeType {
    /// Returns the identifier Keycloak uses for this theme type.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeType::Login => "login",
            ThemeType::Account => "account",
        }
    }

    /// Returns the page templates Keycloak renders for this theme type.
    pub fn default_page_ids(self) -> &'static [&'static str] {
        match self {
            ThemeType::Login => LOGIN_THEME_PAGE_IDS,
            ThemeType::Account => ACCOUNT_THEME_PAGE_IDS,
        }
    }
}

impl fmt::Display for ThemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeType {
    type Err = KeycloakifyError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "login" => Ok(ThemeType::Login),
            "account" => Ok(ThemeType::Account),
            other => Err(KeycloakifyError::config_error(
                format!("Unknown theme type '{}'", other),
                None,
            )),
        }
    }
}

impl TryFrom<String> for ThemeType {
    type Error = KeycloakifyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Pages of the Keycloak login theme.
pub const LOGIN_THEME_PAGE_IDS: &[&str] = &[
    "login.ftl",
    "login-username.ftl",
    "login-password.ftl",
    "webauthn-authenticate.ftl",
    "webauthn-register.ftl",
    "register.ftl",
    "info.ftl",
    "error.ftl",
    "login-reset-password.ftl",
    "login-verify-email.ftl",
    "terms.ftl",
    "login-oauth2-device-verify-user-code.ftl",
    "login-oauth-grant.ftl",
    "login-otp.ftl",
    "login-update-profile.ftl",
    "login-update-password.ftl",
    "login-idp-link-confirm.ftl",
    "login-idp-link-email.ftl",
    "login-page-expired.ftl",
    "login-config-totp.ftl",
    "logout-confirm.ftl",
    "idp-review-user-profile.ftl",
    "update-email.ftl",
    "select-authenticator.ftl",
    "saml-post-form.ftl",
    "delete-credential.ftl",
    "code.ftl",
    "delete-account-confirm.ftl",
    "frontchannel-logout.ftl",
    "login-recovery-authn-code-config.ftl",
    "login-recovery-authn-code-input.ftl",
    "login-reset-otp.ftl",
    "login-x509-info.ftl",
    "webauthn-error.ftl",
];

/// Pages of the Keycloak account theme.
pub const ACCOUNT_THEME_PAGE_IDS: &[&str] = &[
    "password.ftl",
    "account.ftl",
    "sessions.ftl",
    "totp.ftl",
    "applications.ftl",
    "log.ftl",
    "federatedIdentity.ftl",
];

/// Process-wide names shared between the generated templates and the
/// client code that reads them.
///
/// Constructed once and passed explicitly to every component that needs a
/// name, so no component reaches for ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConstants {
    /// Name of the `window` property that receives the Keycloak context.
    pub name_of_the_global: String,
    /// Basename of the directory holding the SPA build inside the theme resources.
    pub resources_dir_basename: String,
    /// Path fragment of Keycloak's shared theme resources.
    pub resources_common: String,
    /// User-profile attribute key carrying realm localization overrides.
    pub localization_realm_overrides_user_profile_property: String,
}

impl Default for ThemeConstants {
    fn default() -> Self {
        Self {
            name_of_the_global: "kcContext".to_string(),
            resources_dir_basename: "build".to_string(),
            resources_common: "resources_common".to_string(),
            localization_realm_overrides_user_profile_property:
                "__localizationRealmOverridesUserProfile".to_string(),
        }
    }
}

impl ThemeConstants {
    /// Returns the FreeMarker expression every rewritten asset path starts with.
    ///
    /// ```
    /// use keycloakify_ftl::core::config::ThemeConstants;
    ///
    /// assert_eq!(
    ///     ThemeConstants::default().resources_path_prefix(),
    ///     "${url.resourcesPath}/build/"
    /// );
    /// ```
    pub fn resources_path_prefix(&self) -> String {
        format!("${{url.resourcesPath}}/{}/", self.resources_dir_basename)
    }
}

/// Options describing the single-page application build being converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    /// The bundler that produced the build.
    pub bundler: Bundler,

    #[serde(default)]
    /// Version of the theme; defaults to the package version.
    pub theme_version: String,

    #[serde(default)]
    /// URL path the SPA was built for. Defaults to `/`.
    pub url_pathname: Option<String>,

    #[serde(default = "default_react_app_build_dir")]
    /// Directory containing the SPA build (and its `index.html`).
    pub react_app_build_dir_path: PathBuf,

    #[serde(default)]
    /// Directory containing the bundler's emitted assets. Defaults to
    /// `<react_app_build_dir_path>/assets`.
    pub assets_dir_path: Option<PathBuf>,

    #[serde(default = "default_theme_building_dir")]
    /// Directory receiving the Maven project with the generated theme.
    pub keycloak_theme_building_dir: PathBuf,

    #[serde(default)]
    /// FreeMarker code excluding parts of the Keycloak context from serialization.
    pub kc_context_exclusions_ftl_code: Option<String>,
}

impl BuildOptions {
    /// Returns the resolved URL path prefix (`/` when none is configured).
    pub fn url_pathname(&self) -> &str {
        self.url_pathname.as_deref().unwrap_or("/")
    }

    /// Returns the path of the SPA's built `index.html`.
    pub fn index_html_path(&self) -> PathBuf {
        self.react_app_build_dir_path.join("index.html")
    }

    /// Returns the directory holding the bundler's emitted assets.
    pub fn assets_dir_path(&self) -> PathBuf {
        self.assets_dir_path
            .clone()
            .unwrap_or_else(|| self.react_app_build_dir_path.join("assets"))
    }

    /// Returns the assets directory relative to the build directory as a
    /// URL path fragment ending in `/`, e.g. `assets/`.
    ///
    /// `None` when the assets directory is not strictly inside the build
    /// directory.
    ///
    /// ```
    /// use keycloakify_ftl::core::config::BuildOptions;
    ///
    /// assert_eq!(
    ///     BuildOptions::default().assets_url_prefix().as_deref(),
    ///     Some("assets/")
    /// );
    /// ```
    pub fn assets_url_prefix(&self) -> Option<String> {
        let assets_dir = self.assets_dir_path();
        let relative =
            assets_dir.strip_prefix(&self.react_app_build_dir_path).ok()?;
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        if segments.is_empty() {
            return None;
        }
        Some(format!("{}/", segments.join("/")))
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            bundler: Bundler::default(),
            theme_version: String::new(),
            url_pathname: None,
            react_app_build_dir_path: default_react_app_build_dir(),
            assets_dir_path: None,
            keycloak_theme_building_dir: default_theme_building_dir(),
            kc_context_exclusions_ftl_code: None,
        }
    }
}

/// Settings of the generated theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    /// Name of the theme as shown in the Keycloak admin console. Defaults to the package name.
    pub name: String,

    #[serde(default = "default_theme_types")]
    /// Theme types to generate.
    pub types: Vec<ThemeType>,

    #[serde(default)]
    /// Form field names exposed to client code through the context object.
    pub field_names: Vec<String>,

    #[serde(default)]
    /// CSS custom properties injected into every page's `<head>`.
    pub css_globals: BTreeMap<String, String>,

    #[serde(default)]
    /// Page ids per theme type, replacing the built-in lists.
    pub page_ids: BTreeMap<ThemeType, Vec<String>>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            types: default_theme_types(),
            field_names: Vec::new(),
            css_globals: BTreeMap::new(),
            page_ids: BTreeMap::new(),
        }
    }
}

impl ThemeConfig {
    /// Returns the page ids to generate for a theme type.
    pub fn page_ids_for(&self, theme_type: ThemeType) -> Vec<String> {
        match self.page_ids.get(&theme_type) {
            Some(page_ids) => page_ids.clone(),
            None => theme_type
                .default_page_ids()
                .iter()
                .map(|page_id| page_id.to_string())
                .collect(),
        }
    }
}

/// Metadata of the application package, used for the Maven descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    /// Package name.
    pub name: String,
    #[serde(default = "default_package_version")]
    /// Package version.
    pub version: String,
    #[serde(default)]
    /// Optional homepage URL, used to derive the Maven group id.
    pub homepage: Option<String>,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_package_version(),
            homepage: None,
        }
    }
}

/// The complete configuration of a theme build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    /// Options describing the SPA build.
    pub build: BuildOptions,

    #[serde(default)]
    /// Settings of the generated theme.
    pub theme: ThemeConfig,

    #[serde(default)]
    /// Application package metadata.
    pub package: PackageInfo,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// Builds a [`Config`] from a file, environment variables and overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: HashMap<String, TomlValue>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a configuration file to the builder.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a prefix for environment variables to override configuration values.
    ///
    /// `KEYCLOAKIFY_BUILD__URL_PATHNAME=/auth/` with prefix `KEYCLOAKIFY_`
    /// overrides `build.url_pathname`.
    pub fn with_env_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Adds a key-value pair to override configuration values.
    ///
    /// Keys use the `section.key` form, e.g. `theme.name`.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builds the final configuration by applying all specified settings and overrides.
    ///
    /// Values left empty are resolved from the package metadata before the
    /// result is validated, so the returned configuration is complete.
    pub fn build(self) -> Result<Config> {
        let mut config = if let Some(path) = self.config_file {
            load_from_file(&path)?
        } else {
            Config::default()
        };

        if let Some(prefix) = self.env_prefix {
            apply_env_overrides(&mut config, &prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        resolve_defaults(&mut config);
        validate_config(&config)?;

        Ok(config)
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        KeycloakifyError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        KeycloakifyError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_env_overrides(
    config: &mut Config,
    prefix: &str,
) -> Result<()> {
    let mut vars: Vec<(String, String)> = env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect();
    vars.sort();

    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key = stripped
                .trim_start_matches('_')
                .replace("__", ".")
                .to_lowercase();
            apply_config_value(config, &config_key, &value)?;
        }
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &HashMap<String, TomlValue>,
) -> Result<()> {
    let mut keys: Vec<&String> = overrides.keys().collect();
    keys.sort();

    for key in keys {
        let value = match &overrides[key] {
            TomlValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn resolve_defaults(config: &mut Config) {
    if config.build.theme_version.is_empty() {
        config.build.theme_version = config.package.version.clone();
    }
    if config.theme.name.is_empty() {
        config.theme.name = config.package.name.clone();
    }
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    let Some((section, field)) = key.split_once('.') else {
        return Err(KeycloakifyError::config_error(
            format!("Unknown configuration key: {}", key),
            None,
        ));
    };

    match section {
        "build" => apply_build_value(&mut config.build, field, value),
        "theme" => apply_theme_value(&mut config.theme, field, value),
        "package" => {
            apply_package_value(&mut config.package, field, value)
        }
        _ => Err(KeycloakifyError::config_error(
            format!("Unknown configuration section: {}", section),
            None,
        )),
    }
}

fn apply_build_value(
    build: &mut BuildOptions,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "bundler" => build.bundler = value.parse()?,
        "theme_version" => build.theme_version = value.to_string(),
        "url_pathname" => build.url_pathname = Some(value.to_string()),
        "react_app_build_dir_path" => {
            build.react_app_build_dir_path = PathBuf::from(value)
        }
        "assets_dir_path" => {
            build.assets_dir_path = Some(PathBuf::from(value))
        }
        "keycloak_theme_building_dir" => {
            build.keycloak_theme_building_dir = PathBuf::from(value)
        }
        "kc_context_exclusions_ftl_code" => {
            build.kc_context_exclusions_ftl_code =
                Some(value.to_string())
        }
        _ => {
            return Err(KeycloakifyError::config_error(
                format!("Unknown build option: {}", key),
                None,
            ))
        }
    }
    Ok(())
}

fn apply_theme_value(
    theme: &mut ThemeConfig,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "name" => theme.name = value.to_string(),
        "types" => {
            theme.types = split_list(value)
                .map(str::parse::<ThemeType>)
                .collect::<Result<Vec<_>>>()?;
        }
        "field_names" => {
            theme.field_names =
                split_list(value).map(String::from).collect();
        }
        _ => {
            return Err(KeycloakifyError::config_error(
                format!("Unknown theme option: {}", key),
                None,
            ))
        }
    }
    Ok(())
}

fn apply_package_value(
    package: &mut PackageInfo,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "name" => package.name = value.to_string(),
        "version" => package.version = value.to_string(),
        "homepage" => package.homepage = Some(value.to_string()),
        _ => {
            return Err(KeycloakifyError::config_error(
                format!("Unknown package option: {}", key),
                None,
            ))
        }
    }
    Ok(())
}

/// Splits a comma separated override value, tolerating TOML array syntax.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
}

fn validate_config(config: &Config) -> Result<()> {
    let url_pathname = config.build.url_pathname();
    if !url_pathname.starts_with('/') || !url_pathname.ends_with('/') {
        return Err(KeycloakifyError::config_error(
            format!(
                "url_pathname must start and end with '/', got '{}'",
                url_pathname
            ),
            None,
        ));
    }

    if config.build.theme_version.is_empty() {
        return Err(KeycloakifyError::config_error(
            "No theme version specified",
            None,
        ));
    }

    if config.theme.name.is_empty() || !is_safe_name(&config.theme.name)
    {
        return Err(KeycloakifyError::config_error(
            format!("Invalid theme name '{}'", config.theme.name),
            None,
        ));
    }

    if config.theme.types.is_empty() {
        return Err(KeycloakifyError::config_error(
            "No theme types specified",
            None,
        ));
    }

    if config.package.name.is_empty() {
        return Err(KeycloakifyError::config_error(
            "No package name specified",
            None,
        ));
    }

    Ok(())
}

fn is_safe_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

// Default value functions
fn default_react_app_build_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_theme_building_dir() -> PathBuf {
    PathBuf::from("build_keycloak")
}

fn default_theme_types() -> Vec<ThemeType> {
    vec![ThemeType::Login]
}

fn default_package_version() -> String {
    "0.0.0".to_string()
}

/// Tests for the configuration module.
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal_config() -> Config {
        let mut config = Config::default();
        config.package.name = "my-app".to_string();
        config.theme.types = vec![ThemeType::Login];
        resolve_defaults(&mut config);
        config
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("keycloakify.toml");
        fs::write(
            &config_file,
            r##"
[build]
bundler = "webpack"
url_pathname = "/app/"

[theme]
name = "acme"
types = ["login", "account"]
field_names = ["username", "password"]

[theme.css_globals]
"--brand" = "#fff"

[theme.page_ids]
account = ["account.ftl"]

[package]
name = "acme-app"
version = "2.1.0"
"##,
        )
        .unwrap();

        let config =
            ConfigBuilder::new().with_file(&config_file).build().unwrap();
        assert_eq!(config.build.bundler, Bundler::Webpack);
        assert_eq!(config.build.url_pathname(), "/app/");
        assert_eq!(config.build.theme_version, "2.1.0");
        assert_eq!(
            config.theme.types,
            vec![ThemeType::Login, ThemeType::Account]
        );
        assert_eq!(config.theme.field_names, vec!["username", "password"]);
        assert_eq!(
            config.theme.css_globals.get("--brand").map(String::as_str),
            Some("#fff")
        );
        assert_eq!(
            config.theme.page_ids_for(ThemeType::Account),
            vec!["account.ftl"]
        );
    }

    #[test]
    fn test_theme_name_defaults_to_package_name() {
        let config = ConfigBuilder::new()
            .with_override("package.name", "shop")
            .build()
            .unwrap();
        assert_eq!(config.theme.name, "shop");
        assert_eq!(config.build.theme_version, "0.0.0");
    }

    #[test]
    fn test_url_pathname_must_be_slash_delimited() {
        let mut config = minimal_config();
        config.build.url_pathname = Some("/app".to_string());
        assert!(validate_config(&config).is_err());

        config.build.url_pathname = Some("/app/".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = minimal_config();
        let mut overrides = HashMap::new();
        _ = overrides.insert(
            "theme.types".to_string(),
            TomlValue::String("login, account".to_string()),
        );
        _ = overrides.insert(
            "build.bundler".to_string(),
            TomlValue::String("webpack".to_string()),
        );

        apply_overrides(&mut config, &overrides).unwrap();
        assert_eq!(
            config.theme.types,
            vec![ThemeType::Login, ThemeType::Account]
        );
        assert_eq!(config.build.bundler, Bundler::Webpack);
    }

    #[test]
    fn test_unknown_override_is_rejected() {
        let mut config = minimal_config();
        assert!(apply_config_value(&mut config, "build.nope", "x")
            .is_err());
        assert!(apply_config_value(&mut config, "nope", "x").is_err());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var(
            "KCFTL_TEST_BUILD__URL_PATHNAME",
            "/from-env/",
        );
        let mut config = minimal_config();

        apply_env_overrides(&mut config, "KCFTL_TEST_").unwrap();
        assert_eq!(config.build.url_pathname(), "/from-env/");
        env::remove_var("KCFTL_TEST_BUILD__URL_PATHNAME");
    }

    #[test]
    fn test_assets_url_prefix() {
        let mut options = BuildOptions {
            react_app_build_dir_path: PathBuf::from("build"),
            ..BuildOptions::default()
        };
        assert_eq!(options.assets_dir_path(), PathBuf::from("build/assets"));
        assert_eq!(options.assets_url_prefix().as_deref(), Some("assets/"));

        options.assets_dir_path = Some(PathBuf::from("build/static/js"));
        assert_eq!(
            options.assets_url_prefix().as_deref(),
            Some("static/js/")
        );

        options.assets_dir_path = Some(PathBuf::from("elsewhere"));
        assert_eq!(options.assets_url_prefix(), None);

        options.assets_dir_path = Some(PathBuf::from("build"));
        assert_eq!(options.assets_url_prefix(), None);
    }

    #[test]
    fn test_page_ids_for() {
        let mut theme = ThemeConfig::default();
        assert!(theme
            .page_ids_for(ThemeType::Login)
            .contains(&"login.ftl".to_string()));

        _ = theme
            .page_ids
            .insert(ThemeType::Account, vec!["account.ftl".to_string()]);
        assert_eq!(theme.page_ids_for(ThemeType::Account), vec!["account.ftl"]);
    }
}
