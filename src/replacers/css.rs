//! Rewriting of asset references in inline CSS.
//!
//! Styles are tokenized with `cssparser`. Only the source text of
//! `url(...)` arguments and `@import` strings is replaced, so every other
//! byte of the stylesheet is kept.

use std::collections::BTreeMap;

use cssparser::{
    BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput,
    Token,
};
use log::debug;

use crate::core::config::{BuildOptions, ThemeConstants};
use crate::core::error::{KeycloakifyError, Result};
use crate::core::traits::ImportRewriter;
use crate::replacers::AssetPathResolver;

type CollectResult<'i> =
    std::result::Result<(), ParseError<'i, &'static str>>;

/// A file reference: byte range of its source text and its value.
#[derive(Debug)]
struct Reference {
    start: usize,
    end: usize,
    value: String,
}

/// Rewrites `url(...)` references and `@import` targets of inline styles.
///
/// ```
/// use keycloakify_ftl::core::config::{BuildOptions, ThemeConstants};
/// use keycloakify_ftl::core::traits::ImportRewriter;
/// use keycloakify_ftl::replacers::CssImportRewriter;
///
/// let rewriter = CssImportRewriter::new(
///     &BuildOptions::default(),
///     &ThemeConstants::default(),
/// );
/// assert_eq!(
///     rewriter.rewrite("a { background: url(/bg.png) }").unwrap(),
///     "a { background: url(${url.resourcesPath}/build/bg.png) }"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CssImportRewriter {
    resolver: AssetPathResolver,
}

impl CssImportRewriter {
    /// Creates a rewriter for the given build.
    pub fn new(options: &BuildOptions, constants: &ThemeConstants) -> Self {
        Self {
            resolver: AssetPathResolver::new(options, constants),
        }
    }
}

impl ImportRewriter for CssImportRewriter {
    fn language(&self) -> &'static str {
        "css"
    }

    fn rewrite(&self, code: &str) -> Result<String> {
        let mut input = ParserInput::new(code);
        let mut parser = Parser::new(&mut input);
        let mut references = Vec::new();
        collect_references(&mut parser, &mut references, false).map_err(
            |error| {
                KeycloakifyError::rewrite_error(
                    self.language(),
                    describe(&error),
                )
            },
        )?;

        let mut fixed = String::with_capacity(code.len());
        let mut last_end = 0;
        for reference in &references {
            if let Some(resolved) = self.resolver.resolve(&reference.value) {
                fixed.push_str(&code[last_end..reference.start]);
                fixed.push_str(&resolved);
                last_end = reference.end;
            }
        }
        fixed.push_str(&code[last_end..]);

        if fixed != code {
            debug!("Rewrote asset references in inline style");
        }
        Ok(fixed)
    }
}

/// Walks every token, descending into blocks, and records the references.
///
/// Inside `url(...)` every quoted string is a reference; elsewhere only the
/// string following `@import` is.
fn collect_references<'i>(
    parser: &mut Parser<'i, '_>,
    references: &mut Vec<Reference>,
    in_url: bool,
) -> CollectResult<'i> {
    let mut after_import = false;
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(error)
                if matches!(error.kind, BasicParseErrorKind::EndOfInput) =>
            {
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let text = parser.slice_from(start);
        let offset = start.byte_index();
        let is_import = matches!(
            &token,
            Token::AtKeyword(name) if name.eq_ignore_ascii_case("import")
        );

        match token {
            Token::WhiteSpace(_) => continue,
            Token::Comment(_) => {
                if text.len() < 4 || !text.ends_with("*/") {
                    return Err(parser.new_custom_error("unterminated comment"));
                }
                continue;
            }
            Token::QuotedString(value) => {
                if !is_terminated_string(text) {
                    return Err(parser.new_custom_error("unterminated string"));
                }
                if in_url || after_import {
                    push_quoted(references, offset, text, &value);
                }
            }
            Token::UnquotedUrl(value) => {
                if !text.ends_with(')') {
                    return Err(parser.new_custom_error("unterminated url()"));
                }
                push_unquoted_url(references, offset, text, &value);
            }
            Token::Function(name) if name.eq_ignore_ascii_case("url") => {
                parser.parse_nested_block(|nested| {
                    collect_references(nested, references, true)
                })?;
                if !parser.slice_from(start).ends_with(')') {
                    return Err(parser.new_custom_error("unterminated url()"));
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                parser.parse_nested_block(|nested| {
                    collect_references(nested, references, false)
                })?;
            }
            Token::BadUrl(_) => {
                return Err(
                    parser.new_custom_error("malformed url() reference")
                );
            }
            Token::BadString(_) => {
                return Err(parser.new_custom_error("unterminated string"));
            }
            _ => {}
        }
        after_import = is_import;
    }
}

/// Records the contents of a quoted string, unless it contains escapes.
fn push_quoted(
    references: &mut Vec<Reference>,
    offset: usize,
    text: &str,
    value: &str,
) {
    let inner = &text[1..text.len() - 1];
    if inner == value {
        references.push(Reference {
            start: offset + 1,
            end: offset + text.len() - 1,
            value: value.to_string(),
        });
    }
}

/// Records the argument of an unquoted `url(...)`, unless it contains escapes.
fn push_unquoted_url(
    references: &mut Vec<Reference>,
    offset: usize,
    text: &str,
    value: &str,
) {
    let Some(open) = text.find('(') else {
        return;
    };
    let inner = &text[open + 1..text.len() - 1];
    let leading = inner.len() - inner.trim_start().len();
    let raw = inner.trim();
    if raw == value {
        let start = offset + open + 1 + leading;
        references.push(Reference {
            start,
            end: start + raw.len(),
            value: value.to_string(),
        });
    }
}

/// `true` when `text` ends with the (unescaped) quote it starts with.
fn is_terminated_string(text: &str) -> bool {
    let Some(quote) = text.chars().next() else {
        return false;
    };
    if text.len() < 2 || !text.ends_with(quote) {
        return false;
    }
    let backslashes = text[..text.len() - 1]
        .chars()
        .rev()
        .take_while(|&c| c == '\\')
        .count();
    backslashes % 2 == 0
}

fn describe(error: &ParseError<'_, &'static str>) -> String {
    let message = match &error.kind {
        ParseErrorKind::Custom(message) => message.to_string(),
        ParseErrorKind::Basic(kind) => format!("{:?}", kind),
    };
    format!(
        "{} at line {}, column {}",
        message,
        error.location.line + 1,
        error.location.column
    )
}

/// Builds the `:root` block declaring the configured CSS globals.
///
/// Names without a leading `--` get one; when both `name` and `--name` are
/// configured, the `--name` entry wins. Declarations follow the order of
/// the normalized names. Values are passed through the rewriter so
/// `url(...)` references resolve like any other inline style. Returns
/// `None` when there is nothing to declare.
pub fn generate_css_globals(
    globals: &BTreeMap<String, String>,
    rewriter: &CssImportRewriter,
) -> Result<Option<String>> {
    if globals.is_empty() {
        return Ok(None);
    }

    let mut normalized: BTreeMap<String, &str> = BTreeMap::new();
    for (name, value) in globals {
        if name.starts_with("--") {
            _ = normalized.insert(name.clone(), value);
        } else {
            _ = normalized.entry(format!("--{}", name)).or_insert(value);
        }
    }

    let mut declarations = Vec::with_capacity(normalized.len());
    for (name, value) in &normalized {
        declarations.push(format!(
            "    {}: {};",
            name,
            rewriter.rewrite(value)?
        ));
    }

    Ok(Some(format!(":root {{\n{}\n}}", declarations.join("\n"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> CssImportRewriter {
        let constants = ThemeConstants {
            resources_dir_basename: "kc-resources".to_string(),
            ..ThemeConstants::default()
        };
        CssImportRewriter::new(&BuildOptions::default(), &constants)
    }

    #[test]
    fn test_url_forms() {
        let code = r#".a { background: url(/assets/a.png); }
.b { background: url( "./b.png" ); }
.c { background: URL('/c.png?v=2'); }
.d { background: url(  /d.png  ); }"#;
        let fixed = rewriter().rewrite(code).unwrap();
        assert_eq!(
            fixed,
            r#".a { background: url(${url.resourcesPath}/kc-resources/assets/a.png); }
.b { background: url( "${url.resourcesPath}/kc-resources/b.png" ); }
.c { background: URL('${url.resourcesPath}/kc-resources/c.png?v=2'); }
.d { background: url(  ${url.resourcesPath}/kc-resources/d.png  ); }"#
        );
    }

    #[test]
    fn test_nested_blocks() {
        let code = "@media (min-width: 600px) { .a { mask: image-set(url(/a.png) 1x); } }";
        assert_eq!(
            rewriter().rewrite(code).unwrap(),
            "@media (min-width: 600px) { .a { mask: image-set(url(${url.resourcesPath}/kc-resources/a.png) 1x); } }"
        );
    }

    #[test]
    fn test_import_statement() {
        let fixed = rewriter()
            .rewrite(r#"@import "./theme.css"; @import url(/x.css);"#)
            .unwrap();
        assert_eq!(
            fixed,
            r#"@import "${url.resourcesPath}/kc-resources/theme.css"; @import url(${url.resourcesPath}/kc-resources/x.css);"#
        );
    }

    #[test]
    fn test_other_strings_are_untouched() {
        let code = r#".a::before { content: "/not-a-reference.png"; }"#;
        assert_eq!(rewriter().rewrite(code).unwrap(), code);
    }

    #[test]
    fn test_url_text_in_strings_and_comments_is_valid() {
        for code in [
            r#".a::before { content: "url("; }"#,
            "/* see url( docs */ .a{color:red}",
            r#".a { background: url("a\"b.png"); }"#,
        ] {
            assert_eq!(rewriter().rewrite(code).unwrap(), code);
        }
    }

    #[test]
    fn test_external_references_are_untouched() {
        let code = r#"@import "https://fonts.example.com/a.css";
.a { background: url(data:image/png;base64,AAAA); }
.b { mask: url(#shape); }"#;
        assert_eq!(rewriter().rewrite(code).unwrap(), code);
    }

    #[test]
    fn test_malformed_css_is_an_error() {
        for code in [
            ".a { background: url(/a.png; }",
            "/* never closed",
            ".a { content: \"open; }",
            ".a { background: url(/a.png",
        ] {
            let result = rewriter().rewrite(code);
            assert!(
                matches!(
                    result,
                    Err(KeycloakifyError::RewriteError { language: "css", .. })
                ),
                "{}",
                code
            );
        }
    }

    #[test]
    fn test_generate_css_globals() {
        let mut globals = BTreeMap::new();
        _ = globals.insert("brand".to_string(), "#336699".to_string());
        _ = globals
            .insert("--logo".to_string(), "url(/logo.svg)".to_string());

        let block = generate_css_globals(&globals, &rewriter())
            .unwrap()
            .unwrap();
        assert_eq!(
            block,
            ":root {\n    --brand: #336699;\n    --logo: url(${url.resourcesPath}/kc-resources/logo.svg);\n}"
        );
    }

    #[test]
    fn test_css_globals_duplicate_names() {
        let mut globals = BTreeMap::new();
        _ = globals.insert("brand".to_string(), "#111".to_string());
        _ = globals.insert("--brand".to_string(), "#222".to_string());

        let block = generate_css_globals(&globals, &rewriter())
            .unwrap()
            .unwrap();
        assert_eq!(block, ":root {\n    --brand: #222;\n}");
    }

    #[test]
    fn test_empty_css_globals() {
        assert!(generate_css_globals(&BTreeMap::new(), &rewriter())
            .unwrap()
            .is_none());
    }
}
