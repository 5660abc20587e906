//! Turns a zipped SCORM package into sandbox-ready content.
//!
//! Loading runs in stages, each finishing before the next starts:
//! 1. Extract every safe, non-directory entry into the file table
//! 2. Parse `imsmanifest.xml` and derive the launchable units
//! 3. Reserve one resource handle per file
//! 4. Publish media and script bytes unchanged
//! 5. Rewrite stylesheets (parallel), then markup (parallel), and publish them

use super::manifest::{launchable_units, parse_manifest, MANIFEST_FILE_NAME};
use super::mime::{mime_type_for, ContentKind};
use super::paths::{find_path, normalize_path, resolve_path, strip_suffix};
use super::resources::{ResourceStore, StoredResource};
use super::rewrite::{decode_text, rewrite_markup, rewrite_stylesheet, RewriteContext, Rewritten};
use super::types::{
    ExtractedFile, FileTable, LaunchableUnit, PackageDescriptor, RewriteDiagnostic,
};
use crate::services::config::LoaderOptions;
use crate::types::errors::{PackageError, PackageResult};
use rayon::prelude::*;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// A fully processed package: descriptor, rewritten files and their handles.
#[derive(Debug)]
pub struct LoadedPackage {
    descriptor: PackageDescriptor,
    files: FileTable,
    store: ResourceStore,
}

impl LoadedPackage {
    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// In-package path of a unit's entry file. The href is relative to the
    /// manifest's directory; a direct lookup is the fallback.
    fn locate_unit(&self, unit: &LaunchableUnit) -> Option<&str> {
        resolve_path(&self.descriptor.manifest_path, &unit.entry_path)
            .and_then(|path| find_path(&self.files, &path))
            .or_else(|| find_path(&self.files, &normalize_path(strip_suffix(&unit.entry_path))))
    }

    fn text_of(&self, path: &str) -> Option<String> {
        self.files.get(path).map(|file| decode_text(&file.bytes))
    }
}

/// Package name shown to the user: the archive file name without `.zip`.
pub fn package_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.len().checked_sub(4) {
        Some(cut) if cut > 0 && base.get(cut..).is_some_and(|ext| ext.eq_ignore_ascii_case(".zip")) => {
            base[..cut].to_string()
        }
        _ => base.to_string(),
    }
}

/// Run the whole load pipeline on an in-memory archive. Does not touch any
/// installed package, so it can run on a worker thread.
pub fn build_package(
    file_name: &str,
    archive: &[u8],
    options: &LoaderOptions,
) -> PackageResult<LoadedPackage> {
    let name = package_name(file_name);
    log::info!("Loading package '{}' ({} bytes)", name, archive.len());

    let (mut files, manifest_path) = extract_archive(archive, options)?;
    let manifest_path = manifest_path.ok_or(PackageError::ManifestMissing)?;

    let manifest_xml = files
        .get(&manifest_path)
        .map(|file| decode_text(&file.bytes))
        .ok_or(PackageError::ManifestMissing)?;
    let manifest = parse_manifest(&manifest_xml)?;
    let units = launchable_units(&manifest);
    if units.is_empty() {
        return Err(PackageError::NoLaunchableUnits);
    }

    let mut store = ResourceStore::new(&options.handle_origin);
    for path in files.keys() {
        store.reserve(path);
    }
    for (path, file) in files.iter().filter(|(_, f)| !f.kind.is_rewritable()) {
        store.publish(path, file.mime, Arc::clone(&file.bytes));
    }

    let mut unresolved = rewrite_stage(&mut files, &mut store, ContentKind::Stylesheet);
    unresolved.extend(rewrite_stage(&mut files, &mut store, ContentKind::Markup));

    log::info!(
        "Package '{}' ready: {} files, {} launchable units, {} unresolved references",
        name,
        files.len(),
        units.len(),
        unresolved.len()
    );

    let descriptor = PackageDescriptor {
        name,
        manifest_path,
        manifest,
        launchable_units: units,
        file_count: files.len(),
        unresolved_references: unresolved,
    };
    Ok(LoadedPackage {
        descriptor,
        files,
        store,
    })
}

/// Extract into a path-ordered table. Also returns the first entry (in
/// archive order) named `imsmanifest.xml`, ignoring case.
fn extract_archive(
    archive: &[u8],
    options: &LoaderOptions,
) -> PackageResult<(FileTable, Option<String>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| PackageError::CorruptArchive(e.to_string()))?;

    if zip.len() > options.max_entries {
        return Err(PackageError::ArchiveTooLarge(format!(
            "{} entries exceeds the limit of {}",
            zip.len(),
            options.max_entries
        )));
    }

    let mut files = FileTable::new();
    let mut manifest_path = None;
    let mut total_bytes: u64 = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("Password") || msg.contains("password") {
                PackageError::CorruptArchive("Password-protected archives are not supported".into())
            } else {
                PackageError::CorruptArchive(format!("Failed to read entry {i}: {msg}"))
            }
        })?;

        if entry.is_dir() {
            continue;
        }
        if entry.enclosed_name().is_none() {
            log::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        }
        let path = normalize_path(entry.name());

        let remaining = options.max_uncompressed_bytes.saturating_sub(total_bytes);
        let mut bytes = Vec::new();
        entry
            .by_ref()
            .take(remaining.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| PackageError::CorruptArchive(format!("Failed to read {path}: {e}")))?;
        total_bytes += bytes.len() as u64;
        if total_bytes > options.max_uncompressed_bytes {
            return Err(PackageError::ArchiveTooLarge(format!(
                "uncompressed size exceeds the limit of {} bytes",
                options.max_uncompressed_bytes
            )));
        }

        let file_name = path.rsplit('/').next().unwrap_or(&path);
        if manifest_path.is_none() && file_name.eq_ignore_ascii_case(MANIFEST_FILE_NAME) {
            manifest_path = Some(path.clone());
        }

        let file = ExtractedFile {
            bytes: Arc::from(bytes),
            kind: ContentKind::from_path(&path),
            mime: mime_type_for(&path),
        };
        files.insert(path, file);
    }

    log::debug!("Extracted {} files", files.len());
    Ok((files, manifest_path))
}

/// Rewrite every file of `kind` in parallel, then write the results back
/// into the table and publish them. Returns the unresolved references.
fn rewrite_stage(
    files: &mut FileTable,
    store: &mut ResourceStore,
    kind: ContentKind,
) -> Vec<RewriteDiagnostic> {
    let outputs: Vec<(String, Rewritten)> = {
        let ctx = RewriteContext {
            files: &*files,
            handles: store.handle_map(),
        };
        files
            .par_iter()
            .filter(|(_, file)| file.kind == kind)
            .map(|(path, file)| {
                let text = decode_text(&file.bytes);
                let out = match kind {
                    ContentKind::Markup => rewrite_markup(&text, path, &ctx),
                    _ => rewrite_stylesheet(&text, path, &ctx),
                };
                (path.clone(), out)
            })
            .collect()
    };

    let mut diagnostics = Vec::new();
    for (path, out) in outputs {
        let Some(file) = files.get_mut(&path) else {
            continue;
        };
        file.bytes = Arc::from(out.text.into_bytes());
        store.publish(
            &path,
            &format!("{}; charset=utf-8", file.mime),
            Arc::clone(&file.bytes),
        );
        diagnostics.extend(out.diagnostics);
    }
    log::debug!("Rewrote {:?} stage, {} unresolved", kind, diagnostics.len());
    diagnostics
}

/// Owns at most one loaded package and the page currently shown from it.
#[derive(Debug, Default)]
pub struct PackageLoader {
    options: LoaderOptions,
    package: Option<LoadedPackage>,
    current_page: Option<String>,
}

impl PackageLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            package: None,
            current_page: None,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Release the current package, then build and install a new one.
    pub fn load(&mut self, file_name: &str, archive: &[u8]) -> PackageResult<PackageDescriptor> {
        self.cleanup();
        let package = build_package(file_name, archive, &self.options)?;
        Ok(self.install(package))
    }

    /// Install a package built elsewhere, replacing whatever was loaded.
    pub fn install(&mut self, package: LoadedPackage) -> PackageDescriptor {
        self.cleanup();
        let descriptor = package.descriptor.clone();
        self.package = Some(package);
        descriptor
    }

    pub fn is_loaded(&self) -> bool {
        self.package.is_some()
    }

    pub fn descriptor(&self) -> Option<&PackageDescriptor> {
        self.package.as_ref().map(LoadedPackage::descriptor)
    }

    pub fn files(&self) -> Option<&FileTable> {
        self.package.as_ref().map(LoadedPackage::files)
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    /// Rewritten entry page of `unit`; it becomes the current page.
    pub fn content_for(&mut self, unit: &LaunchableUnit) -> PackageResult<String> {
        let package = self.package.as_ref().ok_or(PackageError::NotLoaded)?;
        let path = package
            .locate_unit(unit)
            .ok_or_else(|| PackageError::UnitFileNotFound(unit.entry_path.clone()))?;
        let text = package
            .text_of(path)
            .ok_or_else(|| PackageError::UnitFileNotFound(unit.entry_path.clone()))?;

        log::info!("Launching unit '{}' from {}", unit.identifier, path);
        self.current_page = Some(path.to_string());
        Ok(text)
    }

    /// Handle URI of a unit's entry page with its launch parameters appended.
    pub fn unit_url(&self, unit: &LaunchableUnit) -> PackageResult<String> {
        let package = self.package.as_ref().ok_or(PackageError::NotLoaded)?;
        let uri = package
            .locate_unit(unit)
            .and_then(|path| package.store.uri_for(path))
            .ok_or_else(|| PackageError::UnitFileNotFound(unit.entry_path.clone()))?;

        let params = unit.launch_parameters.trim();
        Ok(if params.is_empty() {
            uri.to_string()
        } else if params.starts_with('?') {
            format!("{uri}{params}")
        } else {
            format!("{uri}?{params}")
        })
    }

    /// Follow an in-package link from the current page.
    pub fn navigate(&mut self, href: &str) -> PackageResult<String> {
        let package = self.package.as_ref().ok_or(PackageError::NotLoaded)?;
        let from_current = self
            .current_page
            .as_deref()
            .and_then(|current| resolve_path(current, href))
            .and_then(|path| find_path(&package.files, &path));
        let path = from_current
            .or_else(|| find_path(&package.files, &normalize_path(strip_suffix(href))))
            .ok_or_else(|| PackageError::PageNotFound(href.to_string()))?;
        let text = package
            .text_of(path)
            .ok_or_else(|| PackageError::PageNotFound(href.to_string()))?;

        log::debug!("Navigated to {path}");
        self.current_page = Some(path.to_string());
        Ok(text)
    }

    /// Bytes and MIME type behind a handle URI.
    pub fn resource(&self, uri: &str) -> Option<&StoredResource> {
        self.package.as_ref().and_then(|p| p.store.get(uri))
    }

    /// Handle URI for an in-package path (matched leniently).
    pub fn file_url(&self, path: &str) -> Option<&str> {
        let package = self.package.as_ref()?;
        let found = find_path(&package.files, &normalize_path(path))?;
        package.store.uri_for(found)
    }

    /// Revoke every handle and forget the package. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        if let Some(mut package) = self.package.take() {
            log::info!("Releasing package '{}'", package.descriptor.name);
            package.store.revoke_all();
        }
        self.current_page = None;
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
