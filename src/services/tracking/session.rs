//! The LMS-side state machine behind the SCORM 1.2 API.
//!
//! A session moves `Uninitialized -> Active -> Finished`; `reset` returns it
//! to `Uninitialized` from anywhere. Every operation records its outcome in
//! `last_error` the way `LMSGetLastError` reports it, and a rejected call
//! never touches the store.

use super::defaults::default_values;
use super::error_code::{self, ErrorCode};
use super::events::{ChangeEvent, ChangeKind, ChangeObserver, ObserverId, ObserverRegistry};
use super::schema::{self, CountUpdate, FieldValue, Schema};
use crate::services::config::LearnerProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Active,
    Finished,
}

#[derive(Debug)]
pub struct TrackingSession {
    state: SessionState,
    last_error: ErrorCode,
    store: BTreeMap<String, String>,
    profile: LearnerProfile,
    observers: ObserverRegistry,
    schema: &'static Schema,
}

impl TrackingSession {
    pub fn new(profile: LearnerProfile) -> Self {
        Self {
            state: SessionState::Uninitialized,
            last_error: ErrorCode::NoError,
            store: BTreeMap::new(),
            profile,
            observers: ObserverRegistry::default(),
            schema: schema::scorm12(),
        }
    }

    /// `LMSInitialize`: seed the LMS-provided values and start the session.
    pub fn begin(&mut self) -> Result<(), ErrorCode> {
        if self.state != SessionState::Uninitialized {
            return self.fail(ErrorCode::GeneralException);
        }

        for (element, value) in default_values(&self.profile) {
            self.store.entry(element.to_string()).or_insert(value);
        }
        self.state = SessionState::Active;
        self.last_error = ErrorCode::NoError;
        log::info!(
            "Tracking session started for learner {}",
            self.profile.student_id
        );
        self.emit(ChangeEvent::lifecycle(ChangeKind::Initialize));
        Ok(())
    }

    /// `LMSFinish`. Terminal until the next [`reset`](Self::reset).
    pub fn end(&mut self) -> Result<(), ErrorCode> {
        self.ensure_active()?;
        self.state = SessionState::Finished;
        self.last_error = ErrorCode::NoError;
        log::info!("Tracking session finished ({} elements stored)", self.store.len());
        self.emit(ChangeEvent::lifecycle(ChangeKind::Finish));
        Ok(())
    }

    /// `LMSGetValue`. Valid elements that were never stored read as their
    /// fallback (or `""`).
    pub fn get(&mut self, element: &str) -> Result<String, ErrorCode> {
        self.ensure_active()?;
        if element.is_empty() {
            return self.fail(ErrorCode::InvalidArgument);
        }

        let schema = self.schema;
        let Some(resolved) = schema.lookup(element) else {
            return self.fail(schema.classify_unknown(element));
        };
        if !resolved.def.access.readable() {
            return self.fail(resolved.def.read_error);
        }

        let value = match self.store.get(element) {
            Some(stored) => stored.clone(),
            None => resolved.def.fallback.unwrap_or_default().to_string(),
        };
        self.last_error = ErrorCode::NoError;
        self.emit(ChangeEvent::new(ChangeKind::Get, element, &value));
        Ok(value)
    }

    /// `LMSSetValue`. Checks run in order: state, empty name, known element,
    /// writability, keyword, format, range.
    pub fn set(&mut self, element: &str, value: &str) -> Result<(), ErrorCode> {
        self.ensure_active()?;
        if element.is_empty() {
            return self.fail(ErrorCode::InvalidArgument);
        }

        let schema = self.schema;
        let Some(resolved) = schema.lookup(element) else {
            return self.fail(schema.classify_unknown(element));
        };
        let def = resolved.def;
        if !def.access.writable() {
            return self.fail(def.write_error);
        }
        if schema::is_keyword(element) {
            return self.fail(ErrorCode::InvalidSetKeyword);
        }
        if let Some(format) = def.format {
            let Some(parsed) = format.parse(value) else {
                log::debug!("Rejected {element}={value:?}: bad format");
                return self.fail(ErrorCode::IncorrectDataType);
            };
            if let (Some(range), FieldValue::Number(n)) = (def.range, parsed) {
                if !range.contains(n) {
                    log::debug!("Rejected {element}={value:?}: out of range");
                    return self.fail(ErrorCode::IncorrectDataType);
                }
            }
        }

        if resolved.counts.iter().any(|u| u.required_count().is_none()) {
            log::debug!("Rejected {element}={value:?}: list index out of range");
            return self.fail(ErrorCode::IncorrectDataType);
        }

        self.store.insert(element.to_string(), value.to_string());
        self.apply_counts(&resolved.counts);
        self.last_error = ErrorCode::NoError;
        self.emit(ChangeEvent::new(ChangeKind::Set, element, value));
        Ok(())
    }

    /// `LMSCommit`. Nothing is persisted; observers still see the event.
    pub fn commit(&mut self) -> Result<(), ErrorCode> {
        self.ensure_active()?;
        self.last_error = ErrorCode::NoError;
        self.emit(ChangeEvent::lifecycle(ChangeKind::Commit));
        Ok(())
    }

    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    pub fn error_string(&self, code: &str) -> &'static str {
        error_code::error_string(code)
    }

    pub fn diagnostic(&self, code: &str) -> &'static str {
        error_code::diagnostic_string(code)
    }

    /// Record a failure raised outside the session, e.g. a bad parameter
    /// at the wire boundary.
    pub fn set_last_error(&mut self, code: ErrorCode) {
        self.last_error = code;
    }

    /// Back to an empty `Uninitialized` session. Always succeeds.
    pub fn reset(&mut self) {
        self.state = SessionState::Uninitialized;
        self.last_error = ErrorCode::NoError;
        self.store.clear();
        self.emit(ChangeEvent::lifecycle(ChangeKind::Reset));
    }

    /// Observers run synchronously inside the call that changed the record,
    /// while any lock around the session is still held. An observer must not
    /// call back into the session; forward events with
    /// [`ChannelObserver`](super::events::ChannelObserver) and read the
    /// session from the receiving side instead.
    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: ChangeObserver + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.store.clone()
    }

    /// Debugger write: stores without validation or notification, but
    /// keeps list counts consistent.
    pub fn force_set(&mut self, element: &str, value: &str) {
        log::debug!("Force-setting {element}={value:?}");
        self.store.insert(element.to_string(), value.to_string());
        let schema = self.schema;
        if let Some(resolved) = schema.lookup(element) {
            self.apply_counts(&resolved.counts);
        }
    }

    /// Replace the learner profile used by the next [`begin`](Self::begin).
    pub fn configure(&mut self, profile: LearnerProfile) {
        self.profile = profile;
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once `begin` succeeded, including after `end`.
    pub fn is_initialized(&self) -> bool {
        self.state != SessionState::Uninitialized
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    fn ensure_active(&mut self) -> Result<(), ErrorCode> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Uninitialized => self.fail(ErrorCode::NotInitialized),
            SessionState::Finished => self.fail(ErrorCode::GeneralException),
        }
    }

    fn fail<T>(&mut self, code: ErrorCode) -> Result<T, ErrorCode> {
        self.last_error = code;
        Err(code)
    }

    fn apply_counts(&mut self, updates: &[CountUpdate]) {
        for update in updates {
            let current = self
                .store
                .get(&update.count_element)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let Some(required) = update.required_count() else {
                continue;
            };
            if required > current {
                self.store
                    .insert(update.count_element.clone(), required.to_string());
            }
        }
    }

    fn emit(&mut self, event: ChangeEvent) {
        self.observers.notify(&event);
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new(LearnerProfile::default())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
