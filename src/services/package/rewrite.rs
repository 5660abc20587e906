//! Markup and stylesheet rewriting for sandboxed execution.
//!
//! Relative references are swapped for resource-handle URIs; links between
//! package pages stay intact and get a navigation interceptor instead, since
//! a handle is a static snapshot and cannot re-run this pipeline.

use super::bootstrap::{injection_block, PAGE_NAVIGATE_HOOK};
use super::paths::{find_path, is_external_reference, resolve_path, split_suffix, strip_suffix};
use super::types::{FileTable, RewriteDiagnostic};
use encoding_rs::{Encoding, WINDOWS_1252};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static ATTR_DOUBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s(?:src|href)\s*=\s*")([^"]+)(")"#).expect("valid attribute regex")
});
static ATTR_SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s(?:src|href)\s*=\s*')([^']+)(')"#).expect("valid attribute regex")
});
static URL_DOUBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(url\s*\(\s*")([^"]+)("\s*\))"#).expect("valid url() regex")
});
static URL_SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(url\s*\(\s*')([^']+)('\s*\))"#).expect("valid url() regex")
});
static URL_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(url\s*\()([^)'"]+)(\))"#).expect("valid url() regex")
});
static IMPORT_DOUBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(@import\s+")([^"]+)(")"#).expect("valid @import regex")
});
static IMPORT_SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(@import\s+')([^']+)(')"#).expect("valid @import regex")
});
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s+([^>]*?href\s*=\s*["']([^"']+)["'][^>]*)>"#).expect("valid anchor regex")
});
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid head regex"));
static HTML_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html(?:\s[^>]*)?>").expect("valid html regex"));
static MARKUP_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.html?$").expect("valid markup link regex"));

/// Everything the rewriter needs to map a reference to a handle.
pub struct RewriteContext<'a> {
    pub files: &'a FileTable,
    /// In-package path to resource-handle URI.
    pub handles: &'a HashMap<String, String>,
}

impl RewriteContext<'_> {
    /// Handle URI for `reference` as seen from `base_path`, or the resolved
    /// path (if any) when no file matched.
    fn handle_for(&self, base_path: &str, reference: &str) -> Result<&str, Option<String>> {
        let resolved = resolve_path(base_path, reference);
        resolved
            .as_deref()
            .and_then(|path| find_path(self.files, path))
            .and_then(|found| self.handles.get(found))
            .map(String::as_str)
            .ok_or(resolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    Markup,
    Stylesheet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub diagnostics: Vec<RewriteDiagnostic>,
}

/// Rewrite one markup page: references, link interception, bootstrap script.
pub fn rewrite_markup(content: &str, base_path: &str, ctx: &RewriteContext) -> Rewritten {
    let patterns: [&Regex; 5] = [
        &*ATTR_DOUBLE_RE,
        &*ATTR_SINGLE_RE,
        &*URL_DOUBLE_RE,
        &*URL_SINGLE_RE,
        &*URL_BARE_RE,
    ];
    let mut rewritten = rewrite_references(content, base_path, ctx, &patterns, Payload::Markup);
    rewritten.text = inject_bootstrap(&intercept_page_links(&rewritten.text));
    rewritten
}

/// Rewrite one stylesheet: `url(...)` and `@import` references only.
pub fn rewrite_stylesheet(content: &str, base_path: &str, ctx: &RewriteContext) -> Rewritten {
    let patterns: [&Regex; 5] = [
        &*URL_DOUBLE_RE,
        &*URL_SINGLE_RE,
        &*URL_BARE_RE,
        &*IMPORT_DOUBLE_RE,
        &*IMPORT_SINGLE_RE,
    ];
    rewrite_references(content, base_path, ctx, &patterns, Payload::Stylesheet)
}

fn rewrite_references(
    content: &str,
    base_path: &str,
    ctx: &RewriteContext,
    patterns: &[&Regex],
    payload: Payload,
) -> Rewritten {
    let mut text = content.to_string();
    let mut diagnostics = Vec::new();

    for pattern in patterns {
        text = pattern
            .replace_all(&text, |caps: &Captures| {
                let (prefix, raw, close) = (&caps[1], &caps[2], &caps[3]);
                let reference = raw.trim();

                if reference.is_empty() || is_external_reference(reference) {
                    return caps[0].to_string();
                }

                // Page links are handled by the navigation interceptor.
                if payload == Payload::Markup
                    && prefix.to_ascii_lowercase().contains("href")
                    && is_page_link(reference)
                {
                    return caps[0].to_string();
                }

                match ctx.handle_for(base_path, reference) {
                    Ok(uri) => {
                        log::debug!("Rewrote {reference} in {base_path} -> {uri}");
                        format!("{prefix}{uri}{}{close}", split_suffix(reference))
                    }
                    Err(resolved) => {
                        log::warn!(
                            "Unresolved reference in {base_path}: {reference} (resolved: {})",
                            resolved.as_deref().unwrap_or("-")
                        );
                        diagnostics.push(RewriteDiagnostic {
                            source_path: base_path.to_string(),
                            reference: reference.to_string(),
                            resolved,
                        });
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();
    }

    Rewritten { text, diagnostics }
}

fn is_page_link(reference: &str) -> bool {
    MARKUP_LINK_RE.is_match(strip_suffix(reference))
}

/// Add an `onclick` navigation interceptor to anchors pointing at package pages.
fn intercept_page_links(text: &str) -> String {
    ANCHOR_RE
        .replace_all(text, |caps: &Captures| {
            let (attrs, href) = (&caps[1], &caps[2]);
            if is_external_reference(href)
                || !is_page_link(href)
                || attrs.to_ascii_lowercase().contains("onclick")
            {
                return caps[0].to_string();
            }
            format!(
                "<a {attrs} onclick=\"return window.{PAGE_NAVIGATE_HOOK}('{}')\">",
                href.replace('\'', "\\'")
            )
        })
        .into_owned()
}

/// Insert the bootstrap block right after `<head>`, synthesizing a head when
/// the page has none.
fn inject_bootstrap(text: &str) -> String {
    let block = injection_block();

    if let Some(head) = HEAD_OPEN_RE.find(text) {
        let (before, after) = text.split_at(head.end());
        return format!("{before}\n{block}{after}");
    }
    if let Some(html) = HTML_OPEN_RE.find(text) {
        let (before, after) = text.split_at(html.end());
        return format!("{before}\n<head>{block}</head>\n{after}");
    }
    format!("{block}{text}")
}

/// Decode a text payload: BOM-tagged encodings first, then UTF-8, then
/// Windows-1252 for legacy authoring tools.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (cow, _had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return cow.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (cow, _encoding, _had_errors) = WINDOWS_1252.decode(bytes);
            cow.into_owned()
        }
    }
}

#[cfg(test)]
#[path = "tests/rewrite_tests.rs"]
mod tests;
