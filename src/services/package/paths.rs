//! Archive-relative path handling: normalization, relative resolution and
//! the lenient lookup used to match references against the extracted files.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// References that must never be rewritten: anything with a URI scheme
/// (`http:`, `data:`, `blob:`, `javascript:`...), fragment-only and
/// protocol-relative references.
static EXTERNAL_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*:|#|//)").expect("valid external reference regex")
});

static REPEATED_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("valid slash regex"));

/// Convert back-slashes, strip a leading `./` and collapse repeated separators.
pub fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let stripped = forward.strip_prefix("./").unwrap_or(&forward);
    REPEATED_SLASH_RE.replace_all(stripped, "/").into_owned()
}

pub fn is_external_reference(reference: &str) -> bool {
    EXTERNAL_REF_RE.is_match(reference.trim())
}

/// Strip the `?query` / `#fragment` tail from a reference.
pub fn strip_suffix(reference: &str) -> &str {
    match reference.find(['?', '#']) {
        Some(idx) => &reference[..idx],
        None => reference,
    }
}

/// The `?query` / `#fragment` tail of a reference, including its marker.
pub fn split_suffix(reference: &str) -> &str {
    match reference.find(['?', '#']) {
        Some(idx) => &reference[idx..],
        None => "",
    }
}

/// Directory portion of `path`, including the trailing slash (empty at root).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Resolve `relative` against the directory containing `base`.
///
/// Returns `None` for external references, for references that climb above
/// the package root, and when nothing is left after collapsing.
pub fn resolve_path(base: &str, relative: &str) -> Option<String> {
    let relative = relative.trim();
    if is_external_reference(relative) {
        return None;
    }

    let clean = normalize_path(strip_suffix(relative));
    let joined = format!("{}{}", parent_dir(&normalize_path(base)), clean);

    let mut resolved: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop()?;
            }
            other => resolved.push(other),
        }
    }

    if resolved.is_empty() {
        None
    } else {
        Some(resolved.join("/"))
    }
}

/// Look up `path` among the table keys, tolerating case differences and
/// wrapper folders.
///
/// Order: exact, case-insensitive, suffix match after dropping the first
/// segment, then bare filename when the candidate is at least as deep as the
/// key. The last two steps can pick the wrong file when several directories
/// share a filename; that leniency is relied upon by real archives.
pub fn find_path<'a, V>(table: &'a BTreeMap<String, V>, path: &str) -> Option<&'a str> {
    let normalized = normalize_path(path);
    if let Some(found) = find_normalized(table, &normalized) {
        return Some(found);
    }

    if normalized.contains('%') {
        if let Ok(decoded) = urlencoding::decode(&normalized) {
            if decoded != normalized {
                return find_normalized(table, &decoded);
            }
        }
    }

    None
}

fn find_normalized<'a, V>(table: &'a BTreeMap<String, V>, normalized: &str) -> Option<&'a str> {
    if normalized.is_empty() {
        return None;
    }
    if let Some((key, _)) = table.get_key_value(normalized) {
        return Some(key.as_str());
    }

    let lower = normalized.to_lowercase();
    if let Some(key) = table.keys().find(|k| k.to_lowercase() == lower) {
        return Some(key.as_str());
    }

    let parts: Vec<&str> = normalized.split('/').collect();
    if parts.len() > 1 {
        let without_first = parts[1..].join("/").to_lowercase();
        let nested_suffix = format!("/{without_first}");
        if let Some(key) = table.keys().find(|k| {
            let k = k.to_lowercase();
            k == without_first || k.ends_with(&nested_suffix)
        }) {
            return Some(key.as_str());
        }
    }

    let filename_suffix = format!("/{}", parts[parts.len() - 1].to_lowercase());
    table
        .keys()
        .find(|k| {
            k.to_lowercase().ends_with(&filename_suffix) && k.split('/').count() >= parts.len()
        })
        .map(String::as_str)
}

#[cfg(test)]
#[path = "tests/paths_tests.rs"]
mod tests;
