pub mod package_cmds;
pub mod tracking_cmds;

use crate::services::config::{ConfigService, EmulatorConfig, LearnerProfile};
use crate::services::package::PackageLoader;
use crate::services::tracking::TrackingSession;
use std::sync::{Mutex, MutexGuard};

/// Everything the command layer shares: one config, one loaded package and
/// one learner record.
pub struct AppState {
    pub config: ConfigService,
    pub loader: Mutex<PackageLoader>,
    pub session: Mutex<TrackingSession>,
}

impl AppState {
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            loader: Mutex::new(PackageLoader::new(config.loader.clone())),
            session: Mutex::new(TrackingSession::new(config.learner.clone())),
            config: ConfigService::new(config),
        }
    }

    pub fn lock_loader(&self) -> MutexGuard<'_, PackageLoader> {
        self.loader
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lock_session(&self) -> MutexGuard<'_, TrackingSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a new learner profile; it applies from the next `LMSInitialize`.
    pub fn configure_learner(&self, learner: LearnerProfile) {
        self.lock_session().configure(learner.clone());
        self.config.update_learner(learner);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}
