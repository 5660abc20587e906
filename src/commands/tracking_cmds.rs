//! The SCORM 1.2 `LMS*` call surface. Every value crossing this boundary is
//! text: booleans are `"true"`/`"false"` and error codes are decimal strings.

use super::AppState;
use crate::services::config::LearnerProfile;
use crate::services::tracking::{ErrorCode, SessionState};
use crate::types::errors::{CommandError, CommandResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TRUE: &str = "true";
const FALSE: &str = "false";

fn wire_bool(result: Result<(), ErrorCode>) -> String {
    let text = if result.is_ok() { TRUE } else { FALSE };
    text.to_string()
}

/// Initialize/Finish/Commit only accept the empty-string parameter.
fn check_empty_param(state: &AppState, param: &str) -> bool {
    if param.is_empty() {
        return true;
    }
    state.lock_session().set_last_error(ErrorCode::InvalidArgument);
    false
}

pub fn lms_initialize(state: &AppState, param: &str) -> String {
    if !check_empty_param(state, param) {
        return FALSE.to_string();
    }
    wire_bool(state.lock_session().begin())
}

pub fn lms_finish(state: &AppState, param: &str) -> String {
    if !check_empty_param(state, param) {
        return FALSE.to_string();
    }
    wire_bool(state.lock_session().end())
}

pub fn lms_get_value(state: &AppState, element: &str) -> String {
    state.lock_session().get(element).unwrap_or_default()
}

pub fn lms_set_value(state: &AppState, element: &str, value: &str) -> String {
    wire_bool(state.lock_session().set(element, value))
}

pub fn lms_commit(state: &AppState, param: &str) -> String {
    if !check_empty_param(state, param) {
        return FALSE.to_string();
    }
    wire_bool(state.lock_session().commit())
}

pub fn lms_get_last_error(state: &AppState) -> String {
    state.lock_session().last_error().to_string()
}

pub fn lms_get_error_string(state: &AppState, code: &str) -> String {
    state.lock_session().error_string(code).to_string()
}

pub fn lms_get_diagnostic(state: &AppState, code: &str) -> String {
    state.lock_session().diagnostic(code).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiMethod {
    #[serde(rename = "LMSInitialize")]
    Initialize,
    #[serde(rename = "LMSFinish")]
    Finish,
    #[serde(rename = "LMSGetValue")]
    GetValue,
    #[serde(rename = "LMSSetValue")]
    SetValue,
    #[serde(rename = "LMSCommit")]
    Commit,
    #[serde(rename = "LMSGetLastError")]
    GetLastError,
    #[serde(rename = "LMSGetErrorString")]
    GetErrorString,
    #[serde(rename = "LMSGetDiagnostic")]
    GetDiagnostic,
}

/// One call forwarded by the sandbox frame's script bridge, e.g.
/// `{"method": "LMSSetValue", "args": ["cmi.core.lesson_status", "passed"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    pub method: ApiMethod,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ApiCall {
    /// Missing arguments read as `""`.
    fn arg(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or_default()
    }
}

pub fn handle_api_call(state: &AppState, call: &ApiCall) -> String {
    match call.method {
        ApiMethod::Initialize => lms_initialize(state, call.arg(0)),
        ApiMethod::Finish => lms_finish(state, call.arg(0)),
        ApiMethod::GetValue => lms_get_value(state, call.arg(0)),
        ApiMethod::SetValue => lms_set_value(state, call.arg(0), call.arg(1)),
        ApiMethod::Commit => lms_commit(state, call.arg(0)),
        ApiMethod::GetLastError => lms_get_last_error(state),
        ApiMethod::GetErrorString => lms_get_error_string(state, call.arg(0)),
        ApiMethod::GetDiagnostic => lms_get_diagnostic(state, call.arg(0)),
    }
}

/// Parse and dispatch a JSON-encoded [`ApiCall`].
pub fn handle_api_json(state: &AppState, payload: &str) -> CommandResult<String> {
    let call: ApiCall = serde_json::from_str(payload)
        .map_err(|e| CommandError::Internal(format!("Malformed API call: {e}")))?;
    Ok(handle_api_call(state, &call))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub last_error: ErrorCode,
    pub values: BTreeMap<String, String>,
}

/// Debugger view of the learner record.
pub fn get_session_snapshot_cmd(state: &AppState) -> SessionSnapshot {
    let session = state.lock_session();
    SessionSnapshot {
        state: session.state(),
        last_error: session.last_error(),
        values: session.snapshot(),
    }
}

/// Debugger write that skips validation.
pub fn force_set_value_cmd(state: &AppState, element: &str, value: &str) {
    state.lock_session().force_set(element, value);
}

pub fn reset_session_cmd(state: &AppState) {
    state.lock_session().reset();
    log::info!("Tracking data reset");
}

pub fn configure_learner_cmd(state: &AppState, learner: LearnerProfile) {
    state.configure_learner(learner);
}

#[cfg(test)]
#[path = "tests/tracking_cmds_tests.rs"]
mod tests;
