//! Rewriting of asset references in inline JavaScript.
//!
//! The script is parsed with `oxc`; only string literals the parser
//! identifies as module specifiers (or, for webpack, as the runtime public
//! path) are touched, so the rest of the source is preserved byte for byte.
//! Literals naming a file of the assets directory (`"assets/index-4f2a.js"`,
//! as found in Vite's preload dependency lists) are rewritten as well.

use log::debug;
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    AssignmentExpression, AssignmentTarget, ExportAllDeclaration,
    ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportExpression, StringLiteral,
};
use oxc::ast_visit::{walk, Visit};
use oxc::parser::Parser;
use oxc::span::{SourceType, Span};

use crate::core::config::{BuildOptions, Bundler, ThemeConstants};
use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::ImportRewriter;
use crate::replacers::AssetPathResolver;

/// Rewrites module specifiers of inline scripts so they load from the
/// Keycloak resources path.
///
/// ```
/// use keycloakify_ftl::core::config::{BuildOptions, ThemeConstants};
/// use keycloakify_ftl::core::traits::ImportRewriter;
/// use keycloakify_ftl::replacers::JsImportRewriter;
///
/// let rewriter = JsImportRewriter::new(
///     &BuildOptions::default(),
///     &ThemeConstants::default(),
/// )
/// .module(true);
///
/// let fixed = rewriter.rewrite(r#"import "./assets/index.js";"#).unwrap();
/// assert_eq!(fixed, r#"import "${url.resourcesPath}/build/assets/index.js";"#);
/// ```
#[derive(Debug, Clone)]
pub struct JsImportRewriter {
    resolver: AssetPathResolver,
    bundler: Bundler,
    assets_prefix: Option<String>,
    module: bool,
}

impl JsImportRewriter {
    /// Creates a rewriter for classic (non-module) scripts.
    pub fn new(options: &BuildOptions, constants: &ThemeConstants) -> Self {
        Self {
            resolver: AssetPathResolver::new(options, constants),
            bundler: options.bundler,
            assets_prefix: options.assets_url_prefix(),
            module: false,
        }
    }

    /// Parses scripts as ES modules (`<script type="module">`).
    pub fn module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    fn source_type(&self) -> SourceType {
        if self.module {
            SourceType::mjs()
        } else {
            SourceType::unambiguous()
        }
    }

    fn resolve_literal(&self, value: &str) -> Option<String> {
        self.resolver.resolve(value).or_else(|| {
            let prefix = self.assets_prefix.as_deref()?;
            if value.starts_with(prefix) {
                self.resolver.resolve(&format!("./{}", value))
            } else {
                None
            }
        })
    }
}

impl ImportRewriter for JsImportRewriter {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn rewrite(&self, code: &str) -> Result<String> {
        if code.trim().is_empty() {
            return Ok(code.to_string());
        }

        let allocator = Allocator::default();
        let ret =
            Parser::new(&allocator, code, self.source_type()).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|error| error.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(KeycloakifyError::rewrite_error(
                self.language(),
                if message.is_empty() {
                    "the parser gave up".to_string()
                } else {
                    message
                },
            ));
        }

        let mut collector = SpecifierCollector {
            literals: Vec::new(),
            collect_public_path: self.bundler == Bundler::Webpack,
            assets_prefix: self.assets_prefix.as_deref(),
        };
        collector.visit_program(&ret.program);

        let mut literals = collector.literals;
        literals.sort_by_key(|span| span.start);
        literals.dedup();

        let mut fixed = String::with_capacity(code.len());
        let mut last_end = 0;
        let mut rewritten = 0;

        for span in literals {
            let (start, end) = (span.start as usize, span.end as usize);
            let Some(raw) = code.get(start..end) else {
                return Err(KeycloakifyError::invariant_violation(
                    "string literal span outside of the script source",
                ));
            };
            if raw.len() < 2 {
                continue;
            }
            let value = &raw[1..raw.len() - 1];
            if value.contains('\\') {
                continue;
            }
            if let Some(resolved) = self.resolve_literal(value) {
                fixed.push_str(&code[last_end..start + 1]);
                fixed.push_str(&resolved);
                last_end = end - 1;
                rewritten += 1;
            }
        }
        fixed.push_str(&code[last_end..]);

        debug!("Rewrote {} module reference(s) in inline script", rewritten);
        Ok(fixed)
    }
}

/// Collects the spans (quotes included) of the string literals that name
/// other files.
struct SpecifierCollector<'p> {
    literals: Vec<Span>,
    collect_public_path: bool,
    assets_prefix: Option<&'p str>,
}

impl<'a> Visit<'a> for SpecifierCollector<'_> {
    fn visit_string_literal(&mut self, it: &StringLiteral<'a>) {
        if let Some(prefix) = self.assets_prefix {
            if it.value.as_str().starts_with(prefix) {
                self.literals.push(it.span);
            }
        }
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.literals.push(it.source.span);
    }

    fn visit_export_all_declaration(
        &mut self,
        it: &ExportAllDeclaration<'a>,
    ) {
        self.literals.push(it.source.span);
    }

    fn visit_export_named_declaration(
        &mut self,
        it: &ExportNamedDeclaration<'a>,
    ) {
        if let Some(source) = &it.source {
            self.literals.push(source.span);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &it.source {
            self.literals.push(literal.span);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_assignment_expression(
        &mut self,
        it: &AssignmentExpression<'a>,
    ) {
        // webpack runtime: `__webpack_require__.p = "/"`
        if self.collect_public_path {
            if let (
                AssignmentTarget::StaticMemberExpression(member),
                Expression::StringLiteral(literal),
            ) = (&it.left, &it.right)
            {
                if member.property.name.as_str() == "p" {
                    self.literals.push(literal.span);
                }
            }
        }
        walk::walk_assignment_expression(self, it);
    }
}
