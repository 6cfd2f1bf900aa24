#![allow(clippy::unwrap_used, clippy::expect_used)]

use deepeq_core::errors::DeepEqError;
use deepeq_core::logging_facility::test_capture::{init_test_capture, CapturedEvent, TestCapture};
use deepeq_core::value::Object;
use deepeq_core::{compare, log_op_end, log_op_error, log_op_start, ComparisonConfiguration};
use deepeq_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPARISON_ID, FIELD_DIFFERENCES,
    FIELD_ERR_CODE, FIELD_TYPE_NAME,
};

/// Events of the one `compare` call whose root expected type is `type_name`
fn compare_events(capture: &TestCapture, type_name: &str) -> Vec<CapturedEvent> {
    let start = capture
        .events_for_op("compare")
        .into_iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_START) && e.field(FIELD_TYPE_NAME) == Some(type_name)
        })
        .expect("Should have a start event for this comparison");
    let comparison_id = start
        .field(FIELD_COMPARISON_ID)
        .expect("start event should carry the comparison id")
        .to_string();
    capture
        .events_for_op("compare")
        .into_iter()
        .filter(|e| e.field(FIELD_COMPARISON_ID) == Some(comparison_id.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Macros
// ---------------------------------------------------------------------------

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code_and_path() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = DeepEqError::InvalidRegex {
        pattern: "name(".to_string(),
        reason: "unclosed group".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_INVALID_REGEX"));
    assert_eq!(error_event.field("err.kind"), Some("InvalidRegex"));
    assert_eq!(error_event.field("path"), Some("name("));
    assert_eq!(error_event.field(FIELD_TYPE_NAME), Some(""));
}

#[test]
fn test_log_macros_with_extra_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, type_name = "Person", strict = true);

    let start_event = capture
        .events_for_op(op_name)
        .into_iter()
        .next()
        .expect("Should have start event");
    assert_eq!(start_event.field("type_name"), Some("Person"));
    assert_eq!(start_event.field("strict"), Some("true"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_assert_event_exists_fails_for_unknown_op() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_count_events() {
    let capture = init_test_capture();
    let op1_name = "test_count_events_op1_unique_5";
    let op2_name = "test_count_events_op2_unique_5";

    log_op_start!(op1_name);
    log_op_start!(op2_name);
    log_op_end!(op1_name, duration_ms = 10);

    let ours = |e: &CapturedEvent| {
        e.op.as_deref() == Some(op1_name) || e.op.as_deref() == Some(op2_name)
    };
    assert_eq!(
        capture.count_events(|e| ours(e) && e.event.as_deref() == Some(EVENT_START)),
        2
    );
    assert_eq!(
        capture.count_events(|e| ours(e) && e.event.as_deref() == Some(EVENT_END)),
        1
    );
}

// ---------------------------------------------------------------------------
// Comparison boundary
// ---------------------------------------------------------------------------

#[test]
fn test_compare_logs_one_start_and_one_end() {
    let capture = init_test_capture();
    let actual = Object::new("LoggedMismatch")
        .with_member("name", "John")
        .into_value();
    let expected = Object::new("LoggedMismatch")
        .with_member("name", "Jack")
        .into_value();

    let differences = compare(&actual, &expected, &ComparisonConfiguration::default()).unwrap();
    assert_eq!(differences.len(), 1);

    let events = compare_events(&capture, "LoggedMismatch");
    let starts = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .count();
    let ends: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(starts, 1);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field(FIELD_DIFFERENCES), Some("1"));
    assert!(ends[0].field("duration_ms").is_some());
}

#[test]
fn test_compare_failure_logs_end_error() {
    let capture = init_test_capture();
    let config = ComparisonConfiguration::builder()
        .with_compared_fields(["nickname"])
        .build()
        .unwrap();
    let value = Object::new("LoggedFailure")
        .with_member("name", "John")
        .into_value();

    let err = compare(&value, &value, &config).unwrap_err();

    let events = compare_events(&capture, "LoggedFailure");
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event for this comparison");
    assert_eq!(
        error_event.field(FIELD_ERR_CODE),
        Some("ERR_UNKNOWN_COMPARED_FIELD")
    );
    assert_eq!(error_event.field("path"), Some("nickname"));
    assert_eq!(error_event.field(FIELD_TYPE_NAME), Some("LoggedFailure"));
    assert_eq!(
        error_event.field(FIELD_COMPARISON_ID),
        err.comparison_id().map(|id| id.as_str())
    );
    assert!(!events.iter().any(|e| e.event.as_deref() == Some(EVENT_END)));
}

#[test]
fn test_each_comparison_gets_its_own_id() {
    let capture = init_test_capture();
    let value = Object::new("LoggedIds").into_value();
    let config = ComparisonConfiguration::default();

    compare(&value, &value, &config).unwrap();
    compare(&value, &value, &config).unwrap();

    let ids: std::collections::BTreeSet<String> = capture
        .events_for_op("compare")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_START)
                && e.field(FIELD_TYPE_NAME) == Some("LoggedIds")
        })
        .filter_map(|e| e.field(FIELD_COMPARISON_ID).map(str::to_string))
        .collect();
    assert_eq!(ids.len(), 2);
}
