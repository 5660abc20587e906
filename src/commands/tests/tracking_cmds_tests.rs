use super::*;

fn call(method: ApiMethod, args: &[&str]) -> ApiCall {
    ApiCall {
        method,
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

#[test]
fn test_wire_surface_round_trip() {
    let state = AppState::default();

    assert_eq!(lms_initialize(&state, ""), "true");
    assert_eq!(lms_get_last_error(&state), "0");
    assert_eq!(lms_set_value(&state, "cmi.core.lesson_status", "passed"), "true");
    assert_eq!(lms_get_value(&state, "cmi.core.lesson_status"), "passed");
    assert_eq!(lms_commit(&state, ""), "true");
    assert_eq!(lms_finish(&state, ""), "true");
    assert_eq!(lms_get_value(&state, "cmi.core.lesson_status"), "");
    assert_eq!(lms_get_last_error(&state), "101");
}

#[test]
fn test_non_empty_parameter_is_an_invalid_argument() {
    let state = AppState::default();

    assert_eq!(lms_initialize(&state, "x"), "false");
    assert_eq!(lms_get_last_error(&state), "201");
    assert!(!state.lock_session().is_initialized());

    lms_initialize(&state, "");
    assert_eq!(lms_commit(&state, "now"), "false");
    assert_eq!(lms_get_last_error(&state), "201");
    assert_eq!(lms_finish(&state, "bye"), "false");
    assert!(!state.lock_session().is_finished());
}

#[test]
fn test_failed_calls_return_false_or_blank_with_codes() {
    let state = AppState::default();
    assert_eq!(lms_get_value(&state, "cmi.core.student_id"), "");
    assert_eq!(lms_get_last_error(&state), "301");

    lms_initialize(&state, "");
    assert_eq!(lms_set_value(&state, "cmi.core.student_id", "x"), "false");
    assert_eq!(lms_get_last_error(&state), "403");
    assert_eq!(lms_get_error_string(&state, "403"), "Element is read only");
    assert_eq!(lms_get_error_string(&state, "12345"), "Unknown error");
    assert_eq!(
        lms_get_diagnostic(&state, ""),
        "No diagnostic information available"
    );
}

#[test]
fn test_api_call_deserializes_from_bridge_json() {
    let parsed: ApiCall =
        serde_json::from_str(r#"{"method":"LMSSetValue","args":["cmi.comments","hello"]}"#)
            .unwrap();
    assert_eq!(parsed, call(ApiMethod::SetValue, &["cmi.comments", "hello"]));

    let no_args: ApiCall = serde_json::from_str(r#"{"method":"LMSGetLastError"}"#).unwrap();
    assert!(no_args.args.is_empty());
}

#[test]
fn test_handle_api_call_dispatches_every_method() {
    let state = AppState::default();

    assert_eq!(handle_api_call(&state, &call(ApiMethod::Initialize, &[""])), "true");
    assert_eq!(
        handle_api_call(&state, &call(ApiMethod::SetValue, &["cmi.comments", "hi"])),
        "true"
    );
    assert_eq!(
        handle_api_call(&state, &call(ApiMethod::GetValue, &["cmi.comments"])),
        "hi"
    );
    assert_eq!(
        handle_api_call(&state, &call(ApiMethod::SetValue, &["cmi.core.score.raw", "500"])),
        "false"
    );
    assert_eq!(handle_api_call(&state, &call(ApiMethod::GetLastError, &[])), "405");
    assert_eq!(
        handle_api_call(&state, &call(ApiMethod::GetErrorString, &["405"])),
        "Incorrect data type"
    );
    assert!(handle_api_call(&state, &call(ApiMethod::GetDiagnostic, &["405"]))
        .starts_with("Incorrect data type"));
    assert_eq!(handle_api_call(&state, &call(ApiMethod::Commit, &[])), "true");
    assert_eq!(handle_api_call(&state, &call(ApiMethod::Finish, &[])), "true");
}

#[test]
fn test_handle_api_json_rejects_malformed_payloads() {
    let state = AppState::default();

    assert_eq!(
        handle_api_json(&state, r#"{"method":"LMSInitialize","args":[""]}"#).unwrap(),
        "true"
    );
    let err = handle_api_json(&state, r#"{"method":"LMSLaunchRockets"}"#).unwrap_err();
    assert!(err.to_string().starts_with("Internal error: Malformed API call"));
}

#[test]
fn test_debugger_commands() {
    let state = AppState::default();
    lms_initialize(&state, "");
    force_set_value_cmd(&state, "cmi.core.student_name", "Forced Name");

    let snapshot = get_session_snapshot_cmd(&state);
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.values["cmi.core.student_name"], "Forced Name");

    reset_session_cmd(&state);
    let snapshot = get_session_snapshot_cmd(&state);
    assert_eq!(snapshot.state, SessionState::Uninitialized);
    assert!(snapshot.values.is_empty());
}

#[test]
fn test_configure_learner_applies_on_next_initialize() {
    let state = AppState::default();
    configure_learner_cmd(
        &state,
        LearnerProfile {
            student_id: "learner-9".into(),
            ..LearnerProfile::default()
        },
    );

    lms_initialize(&state, "");
    assert_eq!(lms_get_value(&state, "cmi.core.student_id"), "learner-9");
    assert_eq!(state.config.get_config().learner.student_id, "learner-9");
}

// Covers: events forwarded over a channel can be handled by code that reads
// the session again
#[test]
fn test_channel_observer_allows_reading_session_from_handler() {
    use crate::services::tracking::{ChangeKind, ChannelObserver};

    let state = AppState::default();
    let (observer, events) = ChannelObserver::channel();
    state.lock_session().subscribe(observer);

    lms_initialize(&state, "");
    lms_set_value(&state, "cmi.core.lesson_location", "p2");

    let mut seen = Vec::new();
    for event in events.try_iter() {
        if event.kind == ChangeKind::Set {
            seen.push(lms_get_value(&state, &event.element));
        }
    }
    assert_eq!(seen, vec!["p2"]);
}
