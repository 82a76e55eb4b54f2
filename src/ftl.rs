//! # HTML to FTL
//!
//! Turns the `index.html` of a single-page application build into the
//! FreeMarker templates Keycloak renders for each page of a theme.
//!
//! The document is transformed once per theme type, in four phases:
//!
//! 1. inline `<script>` and `<style>` bodies have their asset references
//!    rewritten;
//! 2. `<link href>` and `<script src>` values under the URL prefix are moved
//!    to the Keycloak resources path;
//! 3. the CSS globals block and the context-injection script are prepended
//!    to `<head>`;
//! 4. regions between `keycloakify-ignore-start` and
//!    `keycloakify-ignore-end` meta markers are removed.
//!
//! The result is serialized into a [`Skeleton`], split at the text node the
//! context code replaces. FreeMarker code is not HTML, so it is only spliced
//! in as text, once per page, by [`FtlGenerator::generate`].

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::core::config::{BuildOptions, ThemeConstants, ThemeType};
use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::ImportRewriter;
use crate::dom::{Document, NodeId};
use crate::kc_context::{KcContextCode, KcContextTemplate, KcContextValues};
use crate::replacers::css::generate_css_globals;
use crate::replacers::{
    AssetPathResolver, CssImportRewriter, JsImportRewriter,
};

/// Text of the node standing in for the context code in the document tree.
pub const KC_CONTEXT_PLACEHOLDER: &str = r#"{ "x": "vIdLqMeOed9sdLdIdOxdK0d" }"#;

/// `name` of the meta element opening an ignored region.
pub const IGNORE_START_META: &str = "keycloakify-ignore-start";

/// `name` of the meta element closing an ignored region.
pub const IGNORE_END_META: &str = "keycloakify-ignore-end";

/// `type` values of scripts holding JavaScript.
const JAVASCRIPT_TYPES: &[&str] = &[
    "",
    "module",
    "text/javascript",
    "application/javascript",
    "text/ecmascript",
    "application/ecmascript",
];

/// Inputs of one HTML-to-FTL transformation.
#[derive(Debug, Clone, Copy)]
pub struct FtlGeneratorParams<'a> {
    /// Theme name.
    pub theme_name: &'a str,
    /// The SPA's built `index.html`.
    pub index_html_code: &'a str,
    /// CSS custom properties to declare in every page.
    pub css_globals: &'a BTreeMap<String, String>,
    /// Options of the SPA build.
    pub build_options: &'a BuildOptions,
    /// Shared names.
    pub constants: &'a ThemeConstants,
    /// Version of the generating tool.
    pub keycloakify_version: &'a str,
    /// Theme type of the generated pages.
    pub theme_type: ThemeType,
    /// Form field names exposed to client code.
    pub field_names: &'a [String],
    /// Context-injection template.
    pub kc_context_template: &'a KcContextTemplate,
}

/// A serialized document split where the context code goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    before: String,
    after: String,
}

impl Skeleton {
    /// Serializes `document`, splitting it at the `slot` node.
    ///
    /// The slot itself is left out. Returns an `InvariantViolation` if the
    /// slot is no longer part of the document.
    pub fn from_document(document: &Document, slot: NodeId) -> Result<Self> {
        let (before, after) =
            document.serialize_around(slot).ok_or_else(|| {
                KeycloakifyError::invariant_violation(
                    "context placeholder was removed from the document",
                )
            })?;
        Ok(Self { before, after })
    }

    /// Text preceding the context code.
    pub fn before(&self) -> &str {
        &self.before
    }

    /// Text following the context code.
    pub fn after(&self) -> &str {
        &self.after
    }

    /// Puts `code` where the placeholder was.
    pub fn render(&self, code: &str) -> String {
        let mut out = String::with_capacity(
            self.before.len() + code.len() + self.after.len(),
        );
        out.push_str(&self.before);
        out.push_str(code);
        out.push_str(&self.after);
        out
    }
}

/// The FreeMarker template of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtlCode {
    page_id: String,
    code: String,
}

impl FtlCode {
    /// The page this template renders, e.g. `login.ftl`.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// The template text.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Consumes the template, returning its text.
    pub fn into_string(self) -> String {
        self.code
    }
}

/// Generates the pages of one theme type from a shared skeleton.
#[derive(Debug, Clone)]
pub struct FtlGenerator {
    theme_type: ThemeType,
    skeleton: Skeleton,
    kc_context: KcContextCode,
}

impl FtlGenerator {
    /// Transforms the document and prepares the context code.
    ///
    /// Fails if any inline script or style cannot be rewritten.
    pub fn new(params: &FtlGeneratorParams<'_>) -> Result<Self> {
        let options = params.build_options;
        let constants = params.constants;

        let kc_context =
            params.kc_context_template.render(&KcContextValues {
                field_names: params.field_names,
                keycloakify_version: params.keycloakify_version,
                theme_version: &options.theme_version,
                theme_type: params.theme_type,
                theme_name: params.theme_name,
                resources_common: &constants.resources_common,
                localization_realm_overrides_user_profile_property:
                    &constants
                        .localization_realm_overrides_user_profile_property,
                kc_context_exclusions_ftl_code: options
                    .kc_context_exclusions_ftl_code
                    .as_deref(),
            })?;

        let css = CssImportRewriter::new(options, constants);
        let js = JsImportRewriter::new(options, constants);
        let js_module = js.clone().module(true);

        let mut document = Document::parse(params.index_html_code);

        rewrite_inline_code(&mut document, &js, &js_module, &css)?;
        let rewritten = rewrite_asset_attributes(
            &mut document,
            &AssetPathResolver::new(options, constants),
        );
        debug!("Rewrote {} asset attribute(s)", rewritten);

        let css_globals = generate_css_globals(params.css_globals, &css)?;
        let slot = inject_globals(
            &mut document,
            css_globals.as_deref(),
            &constants.name_of_the_global,
        )?;

        let stripped = strip_ignored_regions(&mut document);
        if stripped > 0 {
            debug!("Removed {} ignored region(s)", stripped);
        }

        let skeleton = Skeleton::from_document(&document, slot)?;
        info!(
            "Prepared {} theme skeleton for '{}'",
            params.theme_type, params.theme_name
        );

        Ok(Self {
            theme_type: params.theme_type,
            skeleton,
            kc_context,
        })
    }

    /// Theme type of the generated pages.
    pub fn theme_type(&self) -> ThemeType {
        self.theme_type
    }

    /// The skeleton shared by every page.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Generates the template of one page.
    ///
    /// Returns `InvalidPageId` if `page_id` is not a plain file name.
    pub fn generate(&self, page_id: &str) -> Result<FtlCode> {
        let code = self.kc_context.for_page(page_id)?;
        debug!("Generating {}", page_id);
        Ok(FtlCode {
            page_id: page_id.to_string(),
            code: self.skeleton.render(&code),
        })
    }
}

fn rewrite_inline_code(
    document: &mut Document,
    js: &JsImportRewriter,
    js_module: &JsImportRewriter,
    css: &CssImportRewriter,
) -> Result<()> {
    for script in document.elements_by_name("script") {
        if document.attr(script, "src").is_some() {
            continue;
        }
        let script_type = document
            .attr(script, "type")
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if !JAVASCRIPT_TYPES.contains(&script_type.as_str()) {
            debug!("Leaving inline script of type '{}' as is", script_type);
            continue;
        }
        let rewriter = if script_type == "module" { js_module } else { js };
        rewrite_element_text(document, script, rewriter)?;
    }

    for style in document.elements_by_name("style") {
        rewrite_element_text(document, style, css)?;
    }
    Ok(())
}

fn rewrite_element_text(
    document: &mut Document,
    element: NodeId,
    rewriter: &dyn ImportRewriter,
) -> Result<()> {
    let code = document.raw_text(element).ok_or_else(|| {
        KeycloakifyError::invariant_violation(format!(
            "inline {} element has non-text children",
            rewriter.language()
        ))
    })?;
    let fixed = rewriter.rewrite(&code)?;
    if fixed != code {
        document.set_text(element, &fixed);
    }
    Ok(())
}

/// Moves `<link href>` and `<script src>` values under the URL prefix to the
/// resources path. Returns how many attributes changed.
fn rewrite_asset_attributes(
    document: &mut Document,
    resolver: &AssetPathResolver,
) -> usize {
    let mut rewritten = 0;
    for (element_name, attr_name) in [("link", "href"), ("script", "src")] {
        for element in document.elements_by_name(element_name) {
            let Some(fixed) = document
                .attr(element, attr_name)
                .and_then(|value| resolver.rewrite_prefixed(value))
            else {
                continue;
            };
            if document.set_attr(element, attr_name, &fixed) {
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Prepends the globals to `<head>` and returns the placeholder node the
/// context code replaces.
fn inject_globals(
    document: &mut Document,
    css_globals: Option<&str>,
    name_of_the_global: &str,
) -> Result<NodeId> {
    let head = document.first_element_by_name("head").ok_or_else(|| {
        KeycloakifyError::invariant_violation("parsed document has no <head>")
    })?;

    if let Some(css) = css_globals {
        let style = document.create_element("style", &[]);
        document.set_text(style, &format!("\n{}\n", css));
        document.prepend_child(head, style);
    }

    let script = document.create_element("script", &[]);
    document.set_text(script, &format!("\nwindow.{}=", name_of_the_global));
    let slot = document.create_text(KC_CONTEXT_PLACEHOLDER);
    document.append_child(script, slot);
    document.prepend_child(head, script);
    Ok(slot)
}

/// Removes every region delimited by ignore meta markers, markers included.
///
/// A start marker only pairs with an end marker among its following
/// siblings. Start markers without one are kept. Returns the number of
/// regions removed.
pub fn strip_ignored_regions(document: &mut Document) -> usize {
    let is_marker = |document: &Document, id: NodeId, name: &str| {
        document.element_name(id) == Some("meta")
            && document.attr(id, "name") == Some(name)
    };

    let starts: Vec<NodeId> = document
        .elements_by_name("meta")
        .into_iter()
        .filter(|&id| is_marker(document, id, IGNORE_START_META))
        .collect();

    let mut stripped = 0;
    for start in starts {
        if !document.is_attached(start) {
            continue;
        }
        let siblings = document.next_siblings(start);
        let Some(end_index) = siblings
            .iter()
            .position(|&id| is_marker(document, id, IGNORE_END_META))
        else {
            warn!(
                "Found <meta name=\"{}\"> without a matching <meta name=\"{}\">, leaving it in place",
                IGNORE_START_META, IGNORE_END_META
            );
            continue;
        };

        for &id in &siblings[..=end_index] {
            document.detach(id);
        }
        document.detach(start);
        stripped += 1;
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;

    const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" href="/favicon.svg" />
    <link rel="stylesheet" href="https://fonts.example.com/a.css" />
    <title>App</title>
    <script type="module" crossorigin src="/assets/index-4f2a.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-9b1c.css">
    <style>body { background: url(/assets/bg.png); }</style>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

    struct Fixture {
        options: BuildOptions,
        constants: ThemeConstants,
        css_globals: BTreeMap<String, String>,
        field_names: Vec<String>,
        template: KcContextTemplate,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                options: BuildOptions {
                    theme_version: "1.0.0".to_string(),
                    url_pathname: Some("/".to_string()),
                    ..BuildOptions::default()
                },
                constants: ThemeConstants {
                    resources_dir_basename: "kc-resources".to_string(),
                    ..ThemeConstants::default()
                },
                css_globals: BTreeMap::new(),
                field_names: vec!["username".to_string()],
                template: KcContextTemplate::embedded().unwrap(),
            }
        }

        fn generator(&self, index_html_code: &str) -> Result<FtlGenerator> {
            FtlGenerator::new(&FtlGeneratorParams {
                theme_name: "acme",
                index_html_code,
                css_globals: &self.css_globals,
                build_options: &self.options,
                constants: &self.constants,
                keycloakify_version: "0.1.0",
                theme_type: ThemeType::Login,
                field_names: &self.field_names,
                kc_context_template: &self.template,
            })
        }
    }

    fn skeleton_document(generator: &FtlGenerator) -> Document {
        Document::parse(&generator.skeleton().render(KC_CONTEXT_PLACEHOLDER))
    }

    #[test]
    fn test_asset_attributes_are_rewritten() {
        let generator = Fixture::new().generator(INDEX_HTML).unwrap();
        let html = generator.skeleton().render("");

        assert!(html.contains(
            r#"src="${url.resourcesPath}/kc-resources/assets/index-4f2a.js""#
        ));
        assert!(html.contains(
            r#"href="${url.resourcesPath}/kc-resources/assets/index-9b1c.css""#
        ));
        assert!(html
            .contains(r#"href="${url.resourcesPath}/kc-resources/favicon.svg""#));
        assert!(html.contains(r#"href="https://fonts.example.com/a.css""#));
        assert!(html.contains(
            "url(${url.resourcesPath}/kc-resources/assets/bg.png)"
        ));
    }

    #[test]
    fn test_no_matching_attributes_is_a_no_op() {
        let mut fixture = Fixture::new();
        fixture.options.url_pathname = Some("/app/".to_string());
        let html = r#"<html><head><script src="https://cdn.example.com/x.js"></script><link rel="stylesheet" href="/other/a.css"></head><body></body></html>"#;

        let generator = fixture.generator(html).unwrap();
        let skeleton = generator.skeleton().render("");
        assert!(skeleton
            .contains(r#"<script src="https://cdn.example.com/x.js"></script>"#));
        assert!(skeleton.contains(r#"href="/other/a.css""#));
    }

    #[test]
    fn test_inline_script_import_is_rewritten() {
        let html = r#"<html><head><script>import "./x.js"</script></head><body></body></html>"#;
        let generator = Fixture::new().generator(html).unwrap();
        assert!(generator
            .skeleton()
            .render("")
            .contains(r#"import "${url.resourcesPath}/kc-resources/x.js""#));
    }

    #[test]
    fn test_context_script_is_first_child_of_head() {
        let mut fixture = Fixture::new();
        _ = fixture
            .css_globals
            .insert("--brand".to_string(), "#fff".to_string());
        let generator = fixture.generator(INDEX_HTML).unwrap();

        let document = skeleton_document(&generator);
        let head = document.first_element_by_name("head").unwrap();
        let children = document.children(head);

        assert_eq!(document.element_name(children[0]), Some("script"));
        assert_eq!(
            document.raw_text(children[0]).as_deref(),
            Some(format!("\nwindow.kcContext={}", KC_CONTEXT_PLACEHOLDER).as_str())
        );
        assert_eq!(document.element_name(children[1]), Some("style"));
        assert!(document
            .raw_text(children[1])
            .unwrap()
            .contains("--brand: #fff;"));
    }

    #[test]
    fn test_empty_css_globals_add_no_style() {
        let html = "<html><head></head><body></body></html>";
        let generator = Fixture::new().generator(html).unwrap();
        let document = skeleton_document(&generator);
        assert_eq!(document.elements_by_name("style").len(), 0);
    }

    #[test]
    fn test_ignored_region_is_removed() {
        let html = r#"<html><head></head><body><meta name="keycloakify-ignore-start"><p>drop me</p><meta name="keycloakify-ignore-end"><p>keep me</p></body></html>"#;
        let generator = Fixture::new().generator(html).unwrap();
        let page = generator.skeleton().render("");

        assert!(!page.contains("drop me"));
        assert!(!page.contains("keycloakify-ignore"));
        assert!(page.contains("keep me"));
    }

    #[test]
    fn test_strip_ignored_regions() {
        let mut document = Document::parse(
            r#"<body>
<meta name="keycloakify-ignore-start"><p>1</p><meta name="keycloakify-ignore-end">
<p>2</p>
<meta name="keycloakify-ignore-start"><p>3</p><p>4</p><meta name="keycloakify-ignore-end">
<div><meta name="keycloakify-ignore-start"><p>5</p></div>
<meta name="keycloakify-ignore-end">
</body>"#,
        );

        assert_eq!(strip_ignored_regions(&mut document), 2);
        let once = document.serialize();
        assert!(!once.contains("<p>1</p>"));
        assert!(once.contains("<p>2</p>"));
        assert!(!once.contains("<p>3</p>"));
        assert!(!once.contains("<p>4</p>"));
        // The nested start has no following end among its siblings.
        assert!(once.contains(
            r#"<div><meta name="keycloakify-ignore-start"><p>5</p></div>"#
        ));

        assert_eq!(strip_ignored_regions(&mut document), 0);
        assert_eq!(document.serialize(), once);
    }

    #[test]
    fn test_pages_differ_only_in_page_id() {
        let generator = Fixture::new().generator(INDEX_HTML).unwrap();
        let login = generator.generate("login.ftl").unwrap();
        let register = generator.generate("register.ftl").unwrap();

        assert_eq!(login.page_id(), "login.ftl");
        assert_ne!(login, register);
        assert_eq!(
            login.as_str().replace("login.ftl", "register.ftl"),
            register.as_str()
        );
        assert!(login.as_str().contains(r#"out["pageId"] = "login.ftl";"#));
        assert!(login.as_str().contains("window.kcContext=\n(()=>{"));
        assert!(!login.as_str().contains(KC_CONTEXT_PLACEHOLDER));
    }

    #[test]
    fn test_invalid_page_id() {
        let generator = Fixture::new().generator(INDEX_HTML).unwrap();
        assert!(matches!(
            generator.generate("../login.ftl"),
            Err(KeycloakifyError::InvalidPageId(_))
        ));
    }

    #[test]
    fn test_placeholder_text_in_the_page_is_kept() {
        let html = format!(
            "<html><head><script>const x = '{}';</script></head><body><p>{}</p></body></html>",
            KC_CONTEXT_PLACEHOLDER, KC_CONTEXT_PLACEHOLDER
        );
        let generator = Fixture::new().generator(&html).unwrap();
        let page = generator.generate("login.ftl").unwrap();

        assert_eq!(page.as_str().matches(KC_CONTEXT_PLACEHOLDER).count(), 2);
        assert!(page.as_str().contains(&format!(
            "<p>{}</p>",
            KC_CONTEXT_PLACEHOLDER
        )));
        assert!(page.as_str().contains("window.kcContext=\n(()=>{"));
    }

    #[test]
    fn test_url_text_in_inline_style_comment() {
        let html = "<html><head><style>/* polyfill for url( */ body{color:red}</style></head><body></body></html>";
        let generator = Fixture::new().generator(html).unwrap();
        assert!(generator
            .skeleton()
            .render("")
            .contains("<style>/* polyfill for url( */ body{color:red}</style>"));
    }

    #[test]
    fn test_malformed_inline_code_aborts() {
        let html = "<html><head><script>import { from ;</script></head><body></body></html>";
        assert!(matches!(
            Fixture::new().generator(html),
            Err(KeycloakifyError::RewriteError { .. })
        ));
    }

    #[test]
    fn test_non_javascript_scripts_are_left_alone() {
        let html = r#"<html><head><script type="application/ld+json">{"@id": "./x"}</script></head><body></body></html>"#;
        let generator = Fixture::new().generator(html).unwrap();
        assert!(generator
            .skeleton()
            .render("")
            .contains(r#"{"@id": "./x"}"#));
    }

    #[test]
    fn test_skeleton_splits_at_the_slot() {
        let mut document = Document::parse("<p>a</p>");
        let body = document.first_element_by_name("body").unwrap();
        let slot = document.create_text(KC_CONTEXT_PLACEHOLDER);
        document.append_child(body, slot);

        let skeleton = Skeleton::from_document(&document, slot).unwrap();
        assert_eq!(skeleton.before(), "<html><head></head><body><p>a</p>");
        assert_eq!(skeleton.after(), "</body></html>");
        assert_eq!(
            skeleton.render("X"),
            "<html><head></head><body><p>a</p>X</body></html>"
        );

        document.detach(slot);
        assert!(Skeleton::from_document(&document, slot)
            .unwrap_err()
            .is_invariant_violation());
    }

    #[test]
    fn test_skeleton_keeps_text_nodes() {
        let generator = Fixture::new().generator(INDEX_HTML).unwrap();
        let document = skeleton_document(&generator);
        let title = document.first_element_by_name("title").unwrap();
        assert!(matches!(
            &document.node(document.children(title)[0]).kind,
            NodeKind::Text(text) if text == "App"
        ));
    }
}
