//! # Keycloak Context Injection
//!
//! The FreeMarker code that serializes Keycloak's request context into a
//! JavaScript object. The code comes from a template wrapped in a
//! `<script>const _=...</script>` envelope, so the file stays valid HTML
//! for editors; only the inner code is injected into pages.
//!
//! Injection happens in two steps. [`KcContextTemplate::render`] fills in
//! every build-level marker once and yields a [`KcContextCode`], then
//! [`KcContextCode::for_page`] substitutes the page id for each page.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use parking_lot::RwLock;
use regex::Regex;

use crate::core::config::ThemeType;
use crate::core::error::{KeycloakifyError, Result};

/// Token replaced by the page id of each generated page.
pub const PAGE_ID_MARKER: &str = "PAGE_ID_xIgLsPgGId9D8e";

const FIELD_NAMES_MARKER: &str = "FIELD_NAMES_eKsIY4ZsZ4xeM";
const KEYCLOAKIFY_VERSION_MARKER: &str = "KEYCLOAKIFY_VERSION_xEdKd3xEdr";
const THEME_VERSION_MARKER: &str = "KEYCLOAKIFY_THEME_VERSION_sIgKd3xEdr3dx";
const THEME_TYPE_MARKER: &str = "KEYCLOAKIFY_THEME_TYPE_dExKd3xEdr";
const THEME_NAME_MARKER: &str = "KEYCLOAKIFY_THEME_NAME_cXxKd3xEer";
const RESOURCES_COMMON_MARKER: &str = "RESOURCES_COMMON_cLsLsMrtDkpVv";
const LOCALIZATION_OVERRIDES_MARKER: &str =
    "lOCALIZATION_REALM_OVERRIDES_USER_PROFILE_PROPERTY_KEY_aaGLsPgGIdeeX";
const USER_DEFINED_EXCLUSIONS_MARKER: &str =
    "USER_DEFINED_EXCLUSIONS_eKsaY4ZsZ4eMr2";

const BUILD_MARKERS: &[&str] = &[
    FIELD_NAMES_MARKER,
    KEYCLOAKIFY_VERSION_MARKER,
    THEME_VERSION_MARKER,
    THEME_TYPE_MARKER,
    THEME_NAME_MARKER,
    RESOURCES_COMMON_MARKER,
    LOCALIZATION_OVERRIDES_MARKER,
    USER_DEFINED_EXCLUSIONS_MARKER,
];

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/kc_context.ftl");

fn envelope_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A<script>const _=(.+)</script>\n?\z")
            .expect("Invalid template envelope regex")
    })
}

fn template_cache() -> &'static RwLock<HashMap<PathBuf, KcContextTemplate>>
{
    static CACHE: OnceLock<RwLock<HashMap<PathBuf, KcContextTemplate>>> =
        OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Build-level values substituted into the template.
#[derive(Debug, Clone, Copy)]
pub struct KcContextValues<'a> {
    /// Form field names exposed through `messagesPerField`.
    pub field_names: &'a [String],
    /// Version of the tool that generated the theme.
    pub keycloakify_version: &'a str,
    /// Version of the theme.
    pub theme_version: &'a str,
    /// Theme type the pages belong to.
    pub theme_type: ThemeType,
    /// Theme name.
    pub theme_name: &'a str,
    /// Path fragment of Keycloak's shared resources.
    pub resources_common: &'a str,
    /// User-profile attribute carrying realm localization overrides.
    pub localization_realm_overrides_user_profile_property: &'a str,
    /// User FreeMarker code run for every serialized key.
    pub kc_context_exclusions_ftl_code: Option<&'a str>,
}

/// The context-serialization code, before build values are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KcContextTemplate {
    code: String,
}

impl KcContextTemplate {
    /// The template shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_TEMPLATE)
    }

    /// Extracts the code from a template envelope and checks its markers.
    pub fn parse(source: &str) -> Result<Self> {
        let code = envelope_regex()
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|code| code.as_str().to_string())
            .ok_or_else(|| {
                KeycloakifyError::invariant_violation(
                    "context template is not wrapped in <script>const _=...</script>",
                )
            })?;

        for marker in BUILD_MARKERS.iter().chain([&PAGE_ID_MARKER]) {
            if !code.contains(marker) {
                return Err(KeycloakifyError::invariant_violation(format!(
                    "context template is missing the {} marker",
                    marker
                )));
            }
        }

        Ok(Self { code })
    }

    /// Loads a template from disk. Each path is read at most once per process.
    pub fn load(path: &Path) -> Result<Self> {
        if let Some(template) = template_cache().read().get(path) {
            return Ok(template.clone());
        }

        debug!("Loading context template from {:?}", path);
        let source = fs::read_to_string(path).map_err(|e| {
            KeycloakifyError::io_error(path.to_path_buf(), e)
        })?;
        let template = Self::parse(&source)?;

        _ = template_cache()
            .write()
            .insert(path.to_path_buf(), template.clone());
        Ok(template)
    }

    /// The extracted code, markers included.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Substitutes every build-level marker once.
    pub fn render(&self, values: &KcContextValues<'_>) -> Result<KcContextCode> {
        let field_names = values
            .field_names
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| KeycloakifyError::internal_error(e.to_string()))?
            .join(", ");

        let substitutions = [
            (FIELD_NAMES_MARKER, field_names.as_str()),
            (KEYCLOAKIFY_VERSION_MARKER, values.keycloakify_version),
            (THEME_VERSION_MARKER, values.theme_version),
            (THEME_TYPE_MARKER, values.theme_type.as_str()),
            (THEME_NAME_MARKER, values.theme_name),
            (RESOURCES_COMMON_MARKER, values.resources_common),
            (
                LOCALIZATION_OVERRIDES_MARKER,
                values.localization_realm_overrides_user_profile_property,
            ),
            (
                USER_DEFINED_EXCLUSIONS_MARKER,
                values.kc_context_exclusions_ftl_code.unwrap_or(""),
            ),
        ];

        let mut code = self.code.clone();
        for (marker, value) in substitutions {
            if !code.contains(marker) {
                return Err(KeycloakifyError::invariant_violation(format!(
                    "context template is missing the {} marker",
                    marker
                )));
            }
            code = code.replacen(marker, value, 1);
        }

        if !code.contains(PAGE_ID_MARKER) {
            return Err(KeycloakifyError::invariant_violation(
                "page id marker lost while rendering the context template",
            ));
        }

        Ok(KcContextCode { code })
    }
}

/// Context code with build values filled in; shared by every page of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KcContextCode {
    code: String,
}

impl KcContextCode {
    /// The code, page id marker included.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Returns the code for one page.
    pub fn for_page(&self, page_id: &str) -> Result<String> {
        validate_page_id(page_id)?;
        Ok(self.code.replacen(PAGE_ID_MARKER, page_id, 1))
    }
}

/// Checks that a page id is a plain file name such as `login.ftl`.
///
/// ```
/// use keycloakify_ftl::kc_context::validate_page_id;
///
/// assert!(validate_page_id("login-otp.ftl").is_ok());
/// assert!(validate_page_id("../login.ftl").is_err());
/// ```
pub fn validate_page_id(page_id: &str) -> Result<()> {
    let valid = !page_id.is_empty()
        && page_id != "."
        && page_id != ".."
        && page_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !page_id.contains("..");
    if valid {
        Ok(())
    } else {
        Err(KeycloakifyError::InvalidPageId(page_id.to_string()))
    }
}
