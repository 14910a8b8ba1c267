//! Integration tests for batched matching and the Gemini client

use crate::helpers::{match_json, RecordingProgress, ScriptedClient};
use redirect_mapper::matching::{
    GeminiClient, InferenceClient, InferenceError, MatchInputs, MatchOrchestrator,
};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-3-flash-preview";

fn urls(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}/page-{}", prefix, i)).collect()
}

fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(SecretString::from("test-key".to_string()))
        .unwrap()
        .with_base_url(format!("{}/v1beta", server.uri()))
}

#[tokio::test]
async fn test_malformed_batch_does_not_stop_the_next() {
    let old = urls("https://old.example", 4);
    let new = urls("https://new.example", 2);

    let client = ScriptedClient::replying(&[
        "[{\"oldUrl\": \"https://old.example/page-0\", ".to_string(),
        match_json(&[
            ("https://old.example/page-2", "https://new.example/page-0", 0.9),
            ("https://old.example/page-3", "https://new.example/page-1", 0.65),
        ]),
    ]);
    let orchestrator = MatchOrchestrator::new(client.clone(), MODEL)
        .with_batch_size(2)
        .with_batch_delay(Duration::ZERO);

    let progress = RecordingProgress::default();
    let outcome = orchestrator
        .match_all(MatchInputs::UrlOnly { old: &old, new: &new }, &progress)
        .await;

    assert_eq!(outcome.total_batches, 2);
    assert_eq!(outcome.matches.len(), 2);
    assert_eq!(outcome.matches[0].old_url, "https://old.example/page-2");
    assert_eq!(outcome.matches[1].confidence, 0.65);

    assert_eq!(outcome.failed_batches.len(), 1);
    assert_eq!(outcome.failed_batches[0].batch_index, 1);

    let errors = progress.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error in batch 1:"));

    assert_eq!(
        progress.statuses(),
        vec![
            "Processing batch 1/2 (2 URLs)...".to_string(),
            "Processing batch 2/2 (2 URLs)...".to_string(),
        ]
    );
    assert_eq!(progress.fractions(), vec![0.5, 1.0]);
    assert_eq!(client.prompts().len(), 2);
}

#[tokio::test]
async fn test_client_error_fails_only_its_batch() {
    let old = urls("https://old.example", 3);
    let new = urls("https://new.example", 1);

    let client = ScriptedClient::failing_with(InferenceError::Api {
        status: 429,
        body: "quota".to_string(),
    });
    let orchestrator = MatchOrchestrator::new(client.clone(), MODEL)
        .with_batch_size(1)
        .with_batch_delay(Duration::ZERO);

    let progress = RecordingProgress::default();
    let outcome = orchestrator
        .match_all(MatchInputs::UrlOnly { old: &old, new: &new }, &progress)
        .await;

    assert_eq!(client.prompts().len(), 3);
    assert_eq!(outcome.failed_batches.len(), 1);
    assert!(outcome.failed_batches[0].error.contains("429"));
    assert!(outcome.matches.is_empty());
}

#[tokio::test]
async fn test_batch_delay_applies_between_batches_only() {
    let old = urls("https://old.example", 3);
    let new = urls("https://new.example", 1);

    let client = ScriptedClient::new(vec![]);
    let orchestrator = MatchOrchestrator::new(client, MODEL)
        .with_batch_size(1)
        .with_batch_delay(Duration::from_millis(40));

    let started = std::time::Instant::now();
    let outcome = orchestrator
        .match_all(
            MatchInputs::UrlOnly { old: &old, new: &new },
            &RecordingProgress::default(),
        )
        .await;

    assert_eq!(outcome.total_batches, 3);
    assert!(started.elapsed() >= Duration::from_millis(80));
}

#[tokio::test]
async fn test_gemini_client_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": "match these" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("[]")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = gemini_client(&mock_server)
        .generate(MODEL, "match these")
        .await
        .unwrap();

    assert_eq!(text, "[]");
}

#[tokio::test]
async fn test_gemini_client_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&mock_server)
        .await;

    let result = gemini_client(&mock_server).generate(MODEL, "prompt").await;

    match result {
        Err(InferenceError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend unavailable");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_orchestrator_with_gemini_and_fenced_output() {
    let mock_server = MockServer::start().await;

    let fenced = format!(
        "```json\n{}\n```",
        match_json(&[("https://old.example/page-0", "https://new.example/page-0", 0.92)])
    );
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(&fenced)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let old = urls("https://old.example", 1);
    let new = urls("https://new.example", 1);
    let orchestrator = MatchOrchestrator::new(Arc::new(gemini_client(&mock_server)), MODEL);

    let outcome = orchestrator
        .match_all(
            MatchInputs::UrlOnly { old: &old, new: &new },
            &RecordingProgress::default(),
        )
        .await;

    assert!(outcome.failed_batches.is_empty());
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].new_url, "https://new.example/page-0");
}
