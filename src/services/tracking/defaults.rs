use super::schema::{
    CMI_CHILDREN, CORE_CHILDREN, DATA_MODEL_VERSION, INTERACTIONS_CHILDREN,
    OBJECTIVES_CHILDREN, SCORE_CHILDREN, STUDENT_DATA_CHILDREN, STUDENT_PREFERENCE_CHILDREN,
};
use crate::services::config::LearnerProfile;

/// Values the LMS provides when a session begins.
pub fn default_values(profile: &LearnerProfile) -> Vec<(&'static str, String)> {
    let fixed = [
        ("cmi._children", CMI_CHILDREN),
        ("cmi._version", DATA_MODEL_VERSION),
        ("cmi.core._children", CORE_CHILDREN),
        ("cmi.core.entry", "ab-initio"),
        ("cmi.core.lesson_status", "not attempted"),
        ("cmi.core.total_time", "0000:00:00"),
        ("cmi.core.score._children", SCORE_CHILDREN),
        ("cmi.comments_from_lms", ""),
        ("cmi.objectives._children", OBJECTIVES_CHILDREN),
        ("cmi.objectives._count", "0"),
        ("cmi.student_data._children", STUDENT_DATA_CHILDREN),
        ("cmi.student_data.max_time_allowed", ""),
        ("cmi.student_data.time_limit_action", ""),
        ("cmi.student_preference._children", STUDENT_PREFERENCE_CHILDREN),
        ("cmi.student_preference.audio", "0"),
        ("cmi.student_preference.language", ""),
        ("cmi.student_preference.speed", "0"),
        ("cmi.student_preference.text", "0"),
        ("cmi.interactions._children", INTERACTIONS_CHILDREN),
        ("cmi.interactions._count", "0"),
    ];

    let mut values: Vec<(&'static str, String)> = fixed
        .into_iter()
        .map(|(element, value)| (element, value.to_string()))
        .collect();
    values.extend([
        ("cmi.core.student_id", profile.student_id.clone()),
        ("cmi.core.student_name", profile.student_name.clone()),
        ("cmi.core.credit", profile.credit.clone()),
        ("cmi.core.lesson_mode", profile.lesson_mode.clone()),
        ("cmi.launch_data", profile.launch_data.clone()),
        ("cmi.student_data.mastery_score", profile.mastery_score.clone()),
    ]);
    values
}
