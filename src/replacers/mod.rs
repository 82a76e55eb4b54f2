//! # Import Rewriters
//!
//! Rewriters for the asset references embedded in inline code. A single
//! page application is built to be served from `url_pathname`; once its
//! `index.html` becomes a Keycloak template the same files are served from
//! `${url.resourcesPath}/<resources dir>/`, so every reference the bundler
//! emitted has to be moved under that prefix.
//!
//! - [`js`]: ES module specifiers and the webpack public path
//! - [`css`]: `url(...)` references, `@import` statements and the `:root`
//!   block declaring CSS globals
//!
//! Both rewriters share an [`AssetPathResolver`], which owns the policy
//! deciding what is a bundler asset and what is an external resource.

use crate::core::config::{BuildOptions, ThemeConstants};

/// CSS rewriting.
pub mod css;

/// JavaScript rewriting.
pub mod js;

pub use css::CssImportRewriter;
pub use js::JsImportRewriter;

/// Maps references emitted by the bundler onto the Keycloak resources path.
///
/// ```
/// use keycloakify_ftl::core::config::{BuildOptions, ThemeConstants};
/// use keycloakify_ftl::replacers::AssetPathResolver;
///
/// let resolver = AssetPathResolver::new(
///     &BuildOptions::default(),
///     &ThemeConstants::default(),
/// );
///
/// assert_eq!(
///     resolver.resolve("./assets/index.js").as_deref(),
///     Some("${url.resourcesPath}/build/assets/index.js")
/// );
/// assert_eq!(resolver.resolve("react"), None);
/// assert_eq!(resolver.resolve("https://cdn.example.com/a.js"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPathResolver {
    url_pathname: String,
    resources_path_prefix: String,
}

impl AssetPathResolver {
    /// Creates a resolver for the given build.
    pub fn new(options: &BuildOptions, constants: &ThemeConstants) -> Self {
        Self {
            url_pathname: options.url_pathname().to_string(),
            resources_path_prefix: constants.resources_path_prefix(),
        }
    }

    /// The URL path prefix the application was built for.
    pub fn url_pathname(&self) -> &str {
        &self.url_pathname
    }

    /// The prefix every rewritten reference starts with.
    pub fn resources_path_prefix(&self) -> &str {
        &self.resources_path_prefix
    }

    /// Rewrites an attribute value (`href`, `src`) that starts with the URL prefix.
    ///
    /// Returns `None` for values outside the prefix, which stay untouched.
    /// Protocol-relative URLs (`//host/...`) are external resources and never match.
    pub fn rewrite_prefixed(&self, value: &str) -> Option<String> {
        if value.starts_with("//") {
            return None;
        }
        value
            .strip_prefix(self.url_pathname.as_str())
            .map(|remainder| {
                format!("{}{}", self.resources_path_prefix, remainder)
            })
    }

    /// Resolves a module specifier or CSS URL.
    ///
    /// Only bundler-relative references are rewritten: those starting with
    /// `./`, `../` or `/`. Relative references are resolved against the URL
    /// prefix first. Bare package names, URLs with a scheme, protocol-relative
    /// URLs and references that resolve outside the prefix yield `None`.
    /// Query strings and fragments are kept verbatim.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        if reference.starts_with('/') {
            return self.rewrite_prefixed(reference);
        }
        if !(reference.starts_with("./") || reference.starts_with("../")) {
            return None;
        }

        let split = reference.find(['?', '#']).unwrap_or(reference.len());
        let (path, suffix) = reference.split_at(split);
        let absolute =
            normalize_path(&format!("{}{}", self.url_pathname, path));

        self.rewrite_prefixed(&absolute)
            .map(|rewritten| format!("{}{}", rewritten, suffix))
    }
}

/// Collapses `.` and `..` segments of an absolute URL path.
///
/// `..` never climbs above the root.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let trailing_slash = path.ends_with('/')
        || path.ends_with("/.")
        || path.ends_with("/..");

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                _ = segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if trailing_slash && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(url_pathname: &str) -> AssetPathResolver {
        let options = BuildOptions {
            url_pathname: Some(url_pathname.to_string()),
            ..BuildOptions::default()
        };
        let constants = ThemeConstants {
            resources_dir_basename: "kc-resources".to_string(),
            ..ThemeConstants::default()
        };
        AssetPathResolver::new(&options, &constants)
    }

    #[test]
    fn test_relative_specifier_resolves_against_prefix() {
        let resolver = resolver("/");
        assert_eq!(
            resolver.resolve("./x.js").as_deref(),
            Some("${url.resourcesPath}/kc-resources/x.js")
        );
        assert_eq!(
            resolver.resolve("./static/../x.js?v=1#top").as_deref(),
            Some("${url.resourcesPath}/kc-resources/x.js?v=1#top")
        );
    }

    #[test]
    fn test_absolute_path_keeps_remainder_verbatim() {
        let resolver = resolver("/app/");
        assert_eq!(
            resolver.resolve("/app/assets/./a.js").as_deref(),
            Some("${url.resourcesPath}/kc-resources/assets/./a.js")
        );
        assert_eq!(resolver.resolve("/other/a.js"), None);
    }

    #[test]
    fn test_parent_reference_outside_prefix_is_untouched() {
        let resolver = resolver("/app/");
        assert_eq!(resolver.resolve("../a.js"), None);
        assert_eq!(
            resolver.resolve("./a.js").as_deref(),
            Some("${url.resourcesPath}/kc-resources/a.js")
        );
    }

    #[test]
    fn test_external_references_are_untouched() {
        let resolver = resolver("/");
        for reference in [
            "react",
            "@scope/pkg/file.js",
            "https://cdn.example.com/a.js",
            "//cdn.example.com/a.js",
            "data:image/png;base64,AAAA",
            "#fragment",
            "",
        ] {
            assert_eq!(resolver.resolve(reference), None, "{}", reference);
        }
    }

    #[test]
    fn test_rewrite_prefixed() {
        let resolver = resolver("/");
        assert_eq!(
            resolver.rewrite_prefixed("/").as_deref(),
            Some("${url.resourcesPath}/kc-resources/")
        );
        assert_eq!(resolver.rewrite_prefixed("favicon.ico"), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/./b/../c.js"), "/a/c.js");
        assert_eq!(normalize_path("/../../a.js"), "/a.js");
        assert_eq!(normalize_path("/a/b/.."), "/a/");
        assert_eq!(normalize_path("/"), "/");
    }
}
