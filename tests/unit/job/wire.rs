use serde_json::json;

use super::*;
use crate::foundation::core::FrameIndex;

#[test]
fn pending_progress_accepts_both_payload_shapes() {
    assert_eq!(
        Progress::from_value(Some(&json!({"current": 1, "total": 5}))),
        Progress::Counted {
            current: 1,
            total: 5
        }
    );
    assert_eq!(
        Progress::from_value(Some(&json!({"status": 0.25}))),
        Progress::Fraction(0.25)
    );
    assert_eq!(Progress::from_value(None), Progress::Unknown);
    assert_eq!(Progress::from_value(Some(&json!("PENDING"))), Progress::Unknown);
}

#[test]
fn progress_fraction_and_display() {
    let counted = Progress::Counted {
        current: 3,
        total: 5,
    };
    assert_eq!(counted.fraction(), Some(0.6));
    assert_eq!(counted.to_string(), "3 / 5");
    assert_eq!(Progress::Fraction(0.4).to_string(), "40%");
    assert_eq!(
        Progress::Counted {
            current: 0,
            total: 0
        }
        .fraction(),
        None
    );
}

#[test]
fn server_pending_body_with_null_successful_decodes() {
    let body: PollResponse =
        serde_json::from_str(r#"{"ready": false, "successful": null, "value": null}"#).unwrap();
    assert_eq!(
        body.classify().unwrap(),
        PollOutcome::Pending(Progress::Unknown)
    );
}

#[test]
fn succeeded_body_yields_dataset() {
    let body = PollResponse::succeeded(json!({
        "coordinates": {
            "0": [{"cls": 0, "team": 0, "x": 10.0, "y": 50.0}],
            "1": []
        }
    }));
    let PollOutcome::Succeeded(ds) = body.classify().unwrap() else {
        panic!("expected success");
    };
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.get(FrameIndex(0)).unwrap()[0].x, 10.0);
}

#[test]
fn status_wrapped_result_is_accepted() {
    let body = PollResponse::succeeded(json!({
        "status": {"3": [{"cls": 0, "team": 1, "x": 1.0, "y": 2.0}]}
    }));
    let PollOutcome::Succeeded(ds) = body.classify().unwrap() else {
        panic!("expected success");
    };
    assert_eq!(ds.bounds().unwrap().first, FrameIndex(3));
}

#[test]
fn succeeded_without_coordinates_is_a_serde_error() {
    let err = PollResponse::succeeded(json!({"other": 1}))
        .classify()
        .unwrap_err();
    assert!(matches!(err, TacticalError::Serde(_)));

    let err = PollResponse::succeeded(json!({"coordinates": {"x": []}}))
        .classify()
        .unwrap_err();
    assert!(matches!(err, TacticalError::Serde(_)));
}

#[test]
fn failure_reason_prefers_message_fields() {
    let outcome = PollResponse::failed(json!({"exc_type": "ValueError", "exc_message": "bad video"}))
        .classify()
        .unwrap();
    assert_eq!(outcome, PollOutcome::Failed("bad video".to_owned()));

    let outcome = PollResponse::failed(json!("boom")).classify().unwrap();
    assert_eq!(outcome, PollOutcome::Failed("boom".to_owned()));

    let outcome = PollResponse {
        ready: true,
        successful: None,
        value: None,
    }
    .classify()
    .unwrap();
    assert_eq!(
        outcome,
        PollOutcome::Failed("backend reported failure".to_owned())
    );
}

#[test]
fn upload_bodies_decode() {
    let ok: UploadResponse = serde_json::from_str(r#"{"result_id": "abc"}"#).unwrap();
    assert_eq!(ok.result_id, "abc");

    let rejected: UploadRejection =
        serde_json::from_str(r#"{"message": "No file part in the request"}"#).unwrap();
    assert_eq!(rejected.message.as_deref(), Some("No file part in the request"));
}
