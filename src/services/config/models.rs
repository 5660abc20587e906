use serde::{Deserialize, Serialize};

/// Learner record values the emulated LMS hands to a SCO on initialize.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LearnerProfile {
    pub student_id: String,
    pub student_name: String,
    pub launch_data: String,
    pub mastery_score: String,
    pub credit: String,      // "credit", "no-credit"
    pub lesson_mode: String, // "normal", "browse", "review"
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            student_id: "student_001".into(),
            student_name: "Test Student".into(),
            launch_data: String::new(),
            mastery_score: String::new(),
            credit: "credit".into(),
            lesson_mode: "normal".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderOptions {
    /// Prefix of every resource-handle URI.
    pub handle_origin: String,
    pub max_entries: usize,
    pub max_uncompressed_bytes: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            handle_origin: "blob:scorm-sandbox".into(),
            max_entries: 20_000,
            max_uncompressed_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EmulatorConfig {
    pub learner: LearnerProfile,
    pub loader: LoaderOptions,
}
