//! End-to-end tests of a mapping run

use crate::helpers::{html_page, match_json, RecordingProgress, ScriptedClient};
use redirect_mapper::config::{parse_config, resolve_api_key_with, Config};
use redirect_mapper::matching::MatchMode;
use redirect_mapper::output::{export_csv, to_table};
use redirect_mapper::pipeline::{Pipeline, RunInputs};
use redirect_mapper::state::{CrawlSide, FetchStatus};
use redirect_mapper::storage::{RunStatus, SqliteStorage, Storage};
use redirect_mapper::{ConfigError, RunState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(crawl: bool) -> Config {
    parse_config(&format!(
        r#"
[input]
old-urls = "old.txt"
new-urls = "new.txt"

[crawler]
enabled = {}
max-retries = 0
request-timeout-ms = 500
backoff-unit-ms = 1
crawl-delay-ms = 0

[inference]
model = "gemini-3-flash-preview"
batch-delay-ms = 0

[output]
database-path = ":memory:"
"#,
        crawl
    ))
    .unwrap()
}

#[tokio::test]
async fn test_url_only_run_end_to_end() {
    let inputs = RunInputs::new(
        vec!["https://old.example/about-us".to_string()],
        vec![
            "https://new.example/company/about".to_string(),
            "https://new.example/contact".to_string(),
        ],
    );
    let client = ScriptedClient::replying(&[match_json(&[(
        "https://old.example/about-us",
        "https://new.example/company/about",
        0.95,
    )])]);

    let pipeline = Pipeline::from_config(&test_config(false), client.clone(), None).unwrap();
    assert_eq!(pipeline.mode(), MatchMode::UrlOnly);

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut state = RunState::new();
    let report = pipeline
        .run(
            &inputs,
            &inputs.fingerprint("cfg"),
            &mut state,
            &mut storage,
            &RecordingProgress::default(),
        )
        .await
        .unwrap();

    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.high, 1);
    assert_eq!(report.total_batches, 1);
    assert!(report.crawl.is_empty());
    assert!(report.failed_batches.is_empty());

    assert_eq!(to_table(&state.matches).len(), 1);
    assert_eq!(export_csv(&state.matches).lines().count(), 2);

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("https://new.example/company/about\nhttps://new.example/contact"));

    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.mode, MatchMode::UrlOnly);
    assert_eq!(run.fingerprint, inputs.fingerprint("cfg"));
    assert_eq!(storage.load_matches(report.run_id).unwrap(), state.matches);
    assert!(storage
        .load_signals(report.run_id, CrawlSide::Old)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_crawled_run_end_to_end() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Widgets | Old Shop",
            "Our widgets",
            "Every widget we sell",
            "Blue and red widgets.",
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old/members"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/products/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Widgets | New Shop",
            "Widgets",
            "Browse widgets",
            "All widget colours.",
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let old_widgets = format!("{}/old/widgets", base);
    let old_members = format!("{}/old/members", base);
    let new_widgets = format!("{}/new/products/widgets", base);
    let inputs = RunInputs::new(
        vec![old_widgets.clone(), old_members.clone()],
        vec![new_widgets.clone(), format!("{}/new/broken", base)],
    );

    let client = ScriptedClient::replying(&[match_json(&[(old_widgets.as_str(), new_widgets.as_str(), 0.7)])]);
    let pipeline = Pipeline::from_config(&test_config(true), client.clone(), None).unwrap();
    assert_eq!(pipeline.mode(), MatchMode::Crawled);

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut state = RunState::new();
    let progress = RecordingProgress::default();
    let report = pipeline
        .run(&inputs, "fp", &mut state, &mut storage, &progress)
        .await
        .unwrap();

    // Crawl phase
    assert_eq!(state.crawl_results_old.len(), 2);
    assert_eq!(state.crawl_results_new.len(), 2);
    assert_eq!(state.auth_required_urls, vec![old_members.clone()]);
    assert_eq!(report.auth_required_urls, vec![old_members.clone()]);
    assert_eq!(report.crawl.len(), 2);
    assert_eq!(report.crawl[0].side, CrawlSide::Old);
    assert_eq!(report.crawl[0].succeeded, 1);
    assert_eq!(report.crawl[0].auth_required, 1);
    assert_eq!(report.crawl[1].failed(), 1);
    assert_eq!(
        state.count_by_status(CrawlSide::New, FetchStatus::Failed),
        1
    );

    // Only successful pages reach the inference request
    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&format!("URL: {}\nTitle: Widgets | Old Shop", old_widgets)));
    assert!(prompts[0].contains("Heading: Widgets\n"));
    assert!(!prompts[0].contains(&old_members));
    assert!(!prompts[0].contains("/new/broken"));

    // Matching phase
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.medium, 1);

    // Checkpoints
    assert_eq!(
        storage.load_signals(report.run_id, CrawlSide::Old).unwrap(),
        state.crawl_results_old
    );
    assert_eq!(
        storage.load_signals(report.run_id, CrawlSide::New).unwrap(),
        state.crawl_results_new
    );
    assert_eq!(storage.load_matches(report.run_id).unwrap(), state.matches);
    assert!(progress
        .statuses()
        .iter()
        .any(|s| s.starts_with("Processing batch 1/1")));
}

#[tokio::test]
async fn test_state_is_reset_between_runs() {
    let inputs = RunInputs::new(
        vec!["https://old.example/a".to_string()],
        vec!["https://new.example/a".to_string()],
    );
    let reply = match_json(&[("https://old.example/a", "https://new.example/a", 0.9)]);
    let client = ScriptedClient::replying(&[reply.clone(), reply]);

    let pipeline = Pipeline::from_config(&test_config(false), client, None).unwrap();
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut state = RunState::new();
    let progress = RecordingProgress::default();

    let first = pipeline
        .run(&inputs, "fp", &mut state, &mut storage, &progress)
        .await
        .unwrap();
    state.auth_required_urls.push("https://old.example/stale".to_string());

    let second = pipeline
        .run(&inputs, "fp", &mut state, &mut storage, &progress)
        .await
        .unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(state.matches.len(), 1);
    assert!(state.auth_required_urls.is_empty());
    assert_eq!(storage.count_runs().unwrap(), 2);
    assert_eq!(storage.get_latest_run().unwrap().unwrap().id, second.run_id);
}

#[tokio::test]
async fn test_empty_new_pool_still_matches() {
    let inputs = RunInputs::new(vec!["https://old.example/a".to_string()], vec![]);
    let client = ScriptedClient::new(vec![]);

    let pipeline = Pipeline::from_config(&test_config(false), client.clone(), None).unwrap();
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let report = pipeline
        .run(
            &inputs,
            "fp",
            &mut RunState::new(),
            &mut storage,
            &RecordingProgress::default(),
        )
        .await
        .unwrap();

    assert_eq!(client.prompts().len(), 1);
    assert_eq!(report.summary.total, 0);
}

#[test]
fn test_configuration_errors_are_detected_up_front() {
    let config = test_config(false);

    let missing_inputs = RunInputs::load(&config.input);
    assert!(matches!(missing_inputs, Err(ConfigError::MissingInput { .. })));

    let missing_key = resolve_api_key_with(&config.inference, |_| None);
    assert!(matches!(missing_key, Err(ConfigError::MissingSecret { ref name }) if name == "GEMINI_API_KEY"));
}

#[test]
fn test_empty_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("old.txt");
    let new = dir.path().join("new.txt");
    std::fs::write(&old, "# nothing here yet\n\n").unwrap();
    std::fs::write(&new, "https://new.example/a\n").unwrap();

    let mut config = test_config(false);
    config.input.old_urls = old.display().to_string();
    config.input.new_urls = new.display().to_string();

    assert!(matches!(
        RunInputs::load(&config.input),
        Err(ConfigError::EmptyInput { .. })
    ));
}
