// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn chunk_places_text_on_its_stream() {
    assert_eq!(
        ReportEvent::chunk(Stream::Stdout, "A\n"),
        ReportEvent::Progress { stdout: Some("A\n".to_string()), stderr: None }
    );
    assert_eq!(
        ReportEvent::chunk(Stream::Stderr, "warn\n"),
        ReportEvent::Progress { stdout: None, stderr: Some("warn\n".to_string()) }
    );
}

#[test]
fn progress_serializes_both_fields() {
    let event = ReportEvent::chunk(Stream::Stdout, "hi");
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({"type": "progress", "data": {"stdout": "hi", "stderr": null}})
    );
}

#[test]
fn result_keeps_null_sibling() {
    let event = ReportEvent::Result { stdout: None, stderr: Some("EXIT CODE 2".to_string()) };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({"type": "result", "data": {"stdout": null, "stderr": "EXIT CODE 2"}})
    );
}

#[test]
fn exception_serializes_message() {
    let event = ReportEvent::Exception { message: "EXIT CODE 1".to_string() };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({"type": "exception", "data": {"message": "EXIT CODE 1"}})
    );
}

#[yare::parameterized(
    progress  = { ReportEvent::chunk(Stream::Stdout, "x"), "progress", false },
    result    = { ReportEvent::Result { stdout: None, stderr: None }, "result", true },
    exception = { ReportEvent::Exception { message: String::new() }, "exception", true },
)]
fn kind_and_terminality(event: ReportEvent, kind: &str, terminal: bool) {
    assert_eq!(event.kind(), kind);
    assert_eq!(event.is_terminal(), terminal);
}

#[test]
fn request_ref_omits_missing_step() {
    let r = RequestRef { execution: Some("e-1".into()), current_step: None };
    assert_eq!(serde_json::to_value(&r).unwrap(), json!({"execution": "e-1"}));
}

#[test]
fn stream_display() {
    assert_eq!(Stream::Stdout.to_string(), "stdout");
    assert_eq!(Stream::Stderr.to_string(), "stderr");
}
