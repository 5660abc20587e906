use super::AppState;
use crate::services::package::{build_package, PackageDescriptor};
use crate::types::errors::{CommandError, CommandResult};
use serde::Serialize;
use std::sync::Arc;

/// Load a package from raw archive bytes. The previous package and learner
/// record are released before the build starts, so a failed load leaves
/// nothing installed. The pipeline runs on the blocking pool; when loads
/// overlap, the most recently completed one wins.
pub async fn load_package_cmd(
    state: Arc<AppState>,
    file_name: String,
    bytes: Vec<u8>,
) -> CommandResult<PackageDescriptor> {
    let options = {
        let mut loader = state.lock_loader();
        loader.cleanup();
        loader.options().clone()
    };
    state.lock_session().reset();

    let package = tokio::task::spawn_blocking(move || build_package(&file_name, &bytes, &options))
        .await
        .map_err(|e| CommandError::Internal(format!("Package load task failed: {e}")))??;

    let descriptor = state.lock_loader().install(package);
    state.lock_session().reset();
    Ok(descriptor)
}

/// Launch a unit by identifier: the learner record starts over and the
/// unit's rewritten entry page is returned for the sandbox frame.
pub fn launch_unit_cmd(state: &AppState, identifier: &str) -> CommandResult<String> {
    let mut loader = state.lock_loader();
    let unit = loader
        .descriptor()
        .and_then(|d| d.launchable_units.iter().find(|u| u.identifier == identifier))
        .cloned()
        .ok_or_else(|| CommandError::NotFound(format!("Launchable unit '{identifier}'")))?;

    state.lock_session().reset();
    Ok(loader.content_for(&unit)?)
}

/// Handle URI (with launch parameters) for a unit, for hosts that load the
/// frame by URL instead of injecting markup.
pub fn get_unit_url_cmd(state: &AppState, identifier: &str) -> CommandResult<String> {
    let loader = state.lock_loader();
    let unit = loader
        .descriptor()
        .and_then(|d| d.launchable_units.iter().find(|u| u.identifier == identifier))
        .ok_or_else(|| CommandError::NotFound(format!("Launchable unit '{identifier}'")))?;
    Ok(loader.unit_url(unit)?)
}

/// Target of `window.parent._scormLoadPage(href)` from inside the frame.
pub fn navigate_cmd(state: &AppState, href: &str) -> CommandResult<String> {
    Ok(state.lock_loader().navigate(href)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// What a host protocol handler serves for a resource-handle URI.
pub fn get_resource_cmd(state: &AppState, uri: &str) -> CommandResult<ResourcePayload> {
    let loader = state.lock_loader();
    let resource = loader
        .resource(uri)
        .ok_or_else(|| CommandError::NotFound(format!("Resource {uri}")))?;
    Ok(ResourcePayload {
        mime: resource.mime.clone(),
        bytes: resource.bytes.to_vec(),
    })
}

pub fn get_package_cmd(state: &AppState) -> Option<PackageDescriptor> {
    state.lock_loader().descriptor().cloned()
}

/// Unload the package and clear the learner record.
pub fn cleanup_cmd(state: &AppState) {
    state.lock_session().reset();
    state.lock_loader().cleanup();
}

#[cfg(test)]
#[path = "tests/package_cmds_tests.rs"]
mod tests;
