//! In-memory resource handles for one loaded package.
//!
//! A handle is an opaque URI (`<origin>/<uuid>`) substituted for a file's
//! original relative path. Handles are reserved for every file up front so
//! pages can reference each other, then published once their final bytes
//! exist. Only the loader creates or revokes them.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Bytes served behind one handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredResource {
    pub path: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
pub struct ResourceStore {
    origin: String,
    /// In-package path to handle URI.
    by_path: HashMap<String, String>,
    /// Handle URI to published bytes.
    published: HashMap<String, StoredResource>,
}

impl ResourceStore {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Reserve (or return the existing) handle URI for `path`.
    pub fn reserve(&mut self, path: &str) -> String {
        if let Some(uri) = self.by_path.get(path) {
            return uri.clone();
        }
        let uri = format!("{}/{}", self.origin, Uuid::new_v4());
        self.by_path.insert(path.to_string(), uri.clone());
        uri
    }

    /// Publish the final bytes for `path`, replacing any earlier snapshot.
    pub fn publish(&mut self, path: &str, mime: &str, bytes: impl Into<Arc<[u8]>>) -> String {
        let uri = self.reserve(path);
        self.published.insert(
            uri.clone(),
            StoredResource {
                path: path.to_string(),
                mime: mime.to_string(),
                bytes: bytes.into(),
            },
        );
        uri
    }

    pub fn uri_for(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    pub fn get(&self, uri: &str) -> Option<&StoredResource> {
        self.published.get(uri)
    }

    /// Path to URI map used while rewriting.
    pub fn handle_map(&self) -> &HashMap<String, String> {
        &self.by_path
    }

    pub fn len(&self) -> usize {
        self.published.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    /// Drop every handle; URIs handed out earlier stop resolving.
    pub fn revoke_all(&mut self) {
        if !self.by_path.is_empty() {
            log::debug!("Revoking {} resource handles", self.by_path.len());
        }
        self.by_path.clear();
        self.published.clear();
    }
}

#[cfg(test)]
#[path = "tests/resources_tests.rs"]
mod tests;
