use std::sync::Arc;
use std::time::Duration;

use decision_outbox::Outbox;
use relay_sdk::{ErrorContext, RelayError};
use sheet_store::{JsonFileSource, SheetStore};

use super::{sheet_key, store_with_rows, ScriptedTransport};
use crate::error::{ErrorCategory, SubmissionError};
use crate::flow::{FlowKind, FlowProfile};
use crate::form::{FormState, Verdict};
use crate::gate::GateError;
use crate::params::InboundParams;
use crate::submitter::DecisionSubmitter;
use crate::target::{TargetPolicy, TargetSource};
use crate::validation::InputError;

const FALLBACK: &str = "https://hooks.example.com/webhook/moh-form";

fn requester(transport: Arc<ScriptedTransport>) -> DecisionSubmitter {
    DecisionSubmitter::new(FlowProfile::preset(FlowKind::Requester), transport)
}

#[tokio::test]
async fn test_end_to_end_req_100() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["req-100", "Approved", "https://hook.example/x"]]);
    let submitter = requester(transport.clone())
        .with_store(store)
        .with_fallback(FALLBACK);

    let form = FormState::new("REQ-100").with_flags(true, false);
    let outcome = submitter.submit(&form).await.unwrap();

    assert_eq!(outcome.target.url, "https://hook.example/x");
    assert_eq!(outcome.target.source, TargetSource::Authorize);
    assert_eq!(outcome.decision, "agree");
    assert_eq!(outcome.response_excerpt.as_deref(), Some("accepted"));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let (url, payload) = &calls[0];
    assert_eq!(url, "https://hook.example/x");
    assert_eq!(payload["id"], "REQ-100");
    assert_eq!(payload["choice"], "agree");
    assert!(payload.get("reason").is_none());
    assert!(payload["timestamp_utc"].as_str().unwrap().ends_with("+00:00"));
}

#[tokio::test]
async fn test_blank_identifier_never_reaches_network() {
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone()).with_fallback(FALLBACK);

    for id in ["", "  ", "\t"] {
        let err = submitter
            .submit(&FormState::new(id).with_flags(true, false))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Input(InputError::MissingIdentifier)));
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_choose_exactly_one() {
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone()).with_fallback(FALLBACK);

    for (agree, disagree) in [(true, true), (false, false)] {
        let form = FormState::new("REQ-1").with_flags(agree, disagree);
        let err = submitter.submit(&form).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.to_string().contains("Choose exactly one"));
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_disagree_needs_reason_agree_drops_it() {
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone()).with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(false, true))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Input(InputError::MissingReason { .. })));

    submitter
        .submit(
            &FormState::new("REQ-1")
                .with_flags(true, false)
                .with_reason("should not be sent"),
        )
        .await
        .unwrap();
    submitter
        .submit(
            &FormState::new("REQ-2")
                .with_flags(false, true)
                .with_reason("data is too sensitive"),
        )
        .await
        .unwrap();

    let calls = transport.calls();
    assert!(calls[0].1.get("reason").is_none());
    assert_eq!(calls[1].1["choice"], "disagree");
    assert_eq!(calls[1].1["reason"], "data is too sensitive");
}

#[tokio::test]
async fn test_owner_gate_blocks_disallowed_state() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-7", "Pending Review", "https://hook.example/x"]]);
    let submitter = DecisionSubmitter::new(FlowProfile::preset(FlowKind::Owner), transport.clone())
        .with_store(store);

    let err = submitter
        .submit(&FormState::new("REQ-7").choose(Verdict::Positive))
        .await
        .unwrap_err();

    match err {
        SubmissionError::Gate(gate) => {
            assert_eq!(gate.observed_state(), Some("Pending Review"));
            assert!(gate.to_string().contains("'Pending Review'"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_owner_gate_requires_row() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-7", "approved", ""]]);
    let submitter = DecisionSubmitter::new(FlowProfile::preset(FlowKind::Owner), transport.clone())
        .with_store(store)
        .with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-8").choose(Verdict::Positive))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Gate(GateError::NotFound { .. })));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_owner_decline_payload() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-7", " DECLINED ", "https://hook.example/owner"]]);
    let submitter = DecisionSubmitter::new(FlowProfile::preset(FlowKind::Owner), transport.clone())
        .with_store(store);

    submitter
        .submit(
            &FormState::new("req-7")
                .choose(Verdict::Negative)
                .with_reason("retention period too long"),
        )
        .await
        .unwrap();

    let (_, payload) = &transport.calls()[0];
    assert_eq!(payload["id"], "req-7");
    assert_eq!(payload["decision"], "decline");
    assert_eq!(payload["reason_for_refusal"], "retention period too long");
    assert_eq!(payload["state_checked"], "DECLINED");
    assert_eq!(payload["authorize"], "https://hook.example/owner");
}

#[tokio::test]
async fn test_gate_without_store_is_configuration_error() {
    let transport = ScriptedTransport::accepting();
    let submitter = DecisionSubmitter::new(FlowProfile::preset(FlowKind::Owner), transport)
        .with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-1").choose(Verdict::Positive))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn test_fallback_used_verbatim() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-1", "approved", ""]]);
    let submitter = requester(transport.clone())
        .with_store(store)
        .with_fallback(FALLBACK);

    let outcome = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap();

    assert_eq!(outcome.target.url, FALLBACK);
    assert_eq!(outcome.target.source, TargetSource::Fallback);
    assert!(outcome.payload.get("authorize").is_none());
}

#[tokio::test]
async fn test_double_encoded_resume_resolves() {
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone()).with_fallback(FALLBACK);

    let form = FormState::new("REQ-1")
        .with_flags(true, false)
        .with_resume_url("https%253A%252F%252Fflow.example.com%252Fwebhook-waiting%252F881");
    let outcome = submitter.submit(&form).await.unwrap();

    assert_eq!(
        outcome.target.url,
        "https://flow.example.com/webhook-waiting/881"
    );
    assert_eq!(transport.calls()[0].0, outcome.target.url);
}

#[tokio::test]
async fn test_resume_from_inbound_query_keeps_its_own_escapes() {
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone()).with_fallback(FALLBACK);

    let params = InboundParams::parse(
        "https://forms.example.com/requester?id=REQ-1&resume=https%253A%252F%252Fx.example%252Fcb%253Fsig%253Da%25252Bb",
    );
    let mut form = FormState::new(params.id().unwrap()).with_flags(true, false);
    form.resume_url = params.resume_url().map(str::to_string);

    let outcome = submitter.submit(&form).await.unwrap();

    assert_eq!(outcome.target.source, TargetSource::Resume);
    assert_eq!(outcome.target.url, "https://x.example/cb?sig=a%2Bb");
    assert_eq!(transport.calls()[0].0, "https://x.example/cb?sig=a%2Bb");
}

#[tokio::test]
async fn test_malformed_resume_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let outbox = Arc::new(Outbox::at(dir.path().join("outbox.jsonl")));
    let transport = ScriptedTransport::accepting();
    let submitter = requester(transport.clone())
        .with_fallback(FALLBACK)
        .with_outbox(outbox.clone());

    let form = FormState::new("REQ-1")
        .with_flags(true, false)
        .with_resume_url("garbage-not-a-url");
    let outcome = submitter.submit(&form).await.unwrap();

    assert_eq!(outcome.target.source, TargetSource::Fallback);
    assert_eq!(transport.calls()[0].0, FALLBACK);
    assert!(outbox.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_refused_url_is_configuration_error_not_kept() {
    let dir = tempfile::tempdir().unwrap();
    let outbox = Arc::new(Outbox::at(dir.path().join("outbox.jsonl")));
    let transport = ScriptedTransport::failing(RelayError::invalid_request(
        "Invalid webhook URL: relative URL without a base",
    ));
    let submitter = requester(transport)
        .with_fallback("not-a-url")
        .with_outbox(outbox.clone());

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(outbox.read_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_configured_priority_prefers_resume() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-1", "approved", "https://hook.example/x"]]);
    let mut profile = FlowProfile::preset(FlowKind::Admin);
    profile.target_policy =
        TargetPolicy::new([TargetSource::Resume, TargetSource::Authorize]).unwrap();

    let submitter = DecisionSubmitter::new(profile, transport.clone()).with_store(store);
    let outcome = submitter
        .submit(
            &FormState::new("REQ-1")
                .choose(Verdict::Positive)
                .with_resume_url("https://flow.example.com/resume"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.target.source, TargetSource::Resume);
}

#[tokio::test]
async fn test_no_destination_configured() {
    let transport = ScriptedTransport::accepting();
    let store = store_with_rows(&[["REQ-1", "approved", "not-a-url"]]);
    let submitter = requester(transport.clone()).with_store(store);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("no destination configured"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_missing_identifier_column_halts() {
    let transport = ScriptedTransport::accepting();
    let dir = tempfile::tempdir().unwrap();
    let source = JsonFileSource::new(dir.path());
    let path = source.path_for(&sheet_key());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"values": [["Ticket", "State"], ["REQ-1", "approved"]]}"#,
    )
    .unwrap();

    let store = SheetStore::new(Arc::new(source), sheet_key(), Duration::from_secs(30));
    let submitter = requester(transport.clone())
        .with_store(Arc::new(store))
        .with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("Ticket, State"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_unreadable_store_is_store_error() {
    let transport = ScriptedTransport::accepting();
    let dir = tempfile::tempdir().unwrap();
    let store = SheetStore::new(
        Arc::new(JsonFileSource::new(dir.path())),
        sheet_key(),
        Duration::from_secs(30),
    );
    let submitter = requester(transport.clone())
        .with_store(Arc::new(store))
        .with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Store);
    assert!(transport.calls().is_empty());
}

fn exhausted_error() -> RelayError {
    let long_body = "x".repeat(500);
    RelayError::http_status(format!("503: {}", long_body))
        .with_context(ErrorContext::for_service("webhook").status_code(503))
        .with_context_value("attempts", 3)
}

#[tokio::test]
async fn test_delivery_failure_kept_in_outbox() {
    let dir = tempfile::tempdir().unwrap();
    let outbox = Arc::new(Outbox::at(dir.path().join("outbox.jsonl")));
    let transport = ScriptedTransport::failing(exhausted_error());
    let submitter = requester(transport)
        .with_fallback(FALLBACK)
        .with_outbox(outbox.clone());

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    match err {
        SubmissionError::Delivery {
            detail,
            attempts,
            status,
            kept_in_outbox,
            outbox_error,
            ..
        } => {
            assert_eq!(detail.chars().count(), 200);
            assert!(detail.starts_with("503: xxx"));
            assert_eq!(attempts, 3);
            assert_eq!(status, Some(503));
            assert!(kept_in_outbox);
            assert!(outbox_error.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let entries = outbox.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].flow, "requester");
    assert_eq!(entries[0].target.as_deref(), Some(FALLBACK));
    assert_eq!(entries[0].payload["id"], "REQ-1");
    assert_eq!(entries[0].attempts, 3);
}

#[tokio::test]
async fn test_outbox_failure_does_not_mask_delivery_failure() {
    let dir = tempfile::tempdir().unwrap();
    let outbox = Arc::new(Outbox::at(dir.path()));
    let transport = ScriptedTransport::failing(exhausted_error());
    let submitter = requester(transport)
        .with_fallback(FALLBACK)
        .with_outbox(outbox);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Delivery);
    match err {
        SubmissionError::Delivery {
            kept_in_outbox,
            outbox_error,
            ..
        } => {
            assert!(!kept_in_outbox);
            assert!(outbox_error.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delivery_failure_without_outbox() {
    let transport = ScriptedTransport::failing(RelayError::network("connection refused"));
    let submitter = requester(transport).with_fallback(FALLBACK);

    let err = submitter
        .submit(&FormState::new("REQ-1").with_flags(true, false))
        .await
        .unwrap_err();

    match err {
        SubmissionError::Delivery {
            detail,
            kept_in_outbox,
            ..
        } => {
            assert_eq!(detail, "connection refused");
            assert!(!kept_in_outbox);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
