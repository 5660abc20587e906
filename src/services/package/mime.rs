//! Content classification for extracted package files.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the loader treats an extracted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// `.html` / `.htm`: rewritten and bootstrapped.
    Markup,
    /// `.css`: references rewritten.
    Stylesheet,
    Script,
    /// Media, fonts, data and anything unknown; published as-is.
    Other,
}

impl ContentKind {
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("html" | "htm") => ContentKind::Markup,
            Some("css") => ContentKind::Stylesheet,
            Some("js" | "mjs") => ContentKind::Script,
            _ => ContentKind::Other,
        }
    }

    pub fn is_rewritable(self) -> bool {
        matches!(self, ContentKind::Markup | ContentKind::Stylesheet)
    }
}

/// Extensions commonly found in SCORM packages, checked before falling back
/// to `mime_guess`.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    ("swf", "application/x-shockwave-flash"),
    ("pdf", "application/pdf"),
];

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Infer the MIME type served for an in-package path.
pub fn mime_type_for(path: &str) -> &'static str {
    let Some(ext) = extension(path) else {
        return FALLBACK_MIME;
    };

    KNOWN_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .or_else(|| mime_guess::from_ext(&ext).first_raw())
        .unwrap_or(FALLBACK_MIME)
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
#[path = "tests/mime_tests.rs"]
mod tests;
