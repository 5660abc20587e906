//! SCORM package loading: archive extraction, manifest parsing, content
//! rewriting and the in-memory resource handles the sandbox frame loads from.

pub mod bootstrap;
pub mod loader;
pub mod manifest;
pub mod mime;
pub mod paths;
pub mod resources;
pub mod rewrite;
pub mod types;

pub use loader::{build_package, package_name, LoadedPackage, PackageLoader};
pub use resources::StoredResource;
pub use types::{LaunchableUnit, Manifest, PackageDescriptor, RewriteDiagnostic};
