use super::mime::ContentKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Parsed `imsmanifest.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub identifier: String,
    pub version: String,
    pub schema_version: String,
    pub organizations: Vec<Organization>,
    pub resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub identifier: String,
    pub resource_type: String,
    pub href: Option<String>,
    /// `sco` or `asset` in SCORM 1.2 packages.
    pub scorm_type: Option<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub identifier: String,
    pub title: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub identifier: String,
    pub identifierref: String,
    pub title: String,
    pub visible: bool,
    pub parameters: String,
    /// Inherited from the referenced resource.
    pub href: Option<String>,
    /// Inherited from the referenced resource.
    pub scorm_type: Option<String>,
    pub children: Vec<Item>,
}

/// A SCO that can be launched into the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchableUnit {
    pub identifier: String,
    pub title: String,
    pub entry_path: String,
    pub launch_parameters: String,
    pub visible: bool,
    /// Item titles from the organization root down to this unit, joined by ` > `.
    pub breadcrumb: String,
}

/// A reference the rewriter could not map to an extracted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteDiagnostic {
    pub source_path: String,
    pub reference: String,
    pub resolved: Option<String>,
}

/// Result of a successful package load, handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub manifest_path: String,
    pub manifest: Manifest,
    pub launchable_units: Vec<LaunchableUnit>,
    pub file_count: usize,
    pub unresolved_references: Vec<RewriteDiagnostic>,
}

/// One entry of the extracted file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub bytes: Arc<[u8]>,
    pub kind: ContentKind,
    pub mime: &'static str,
}

/// Normalized in-package path to file, ordered by path.
pub type FileTable = BTreeMap<String, ExtractedFile>;
