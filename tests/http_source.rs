use std::time::Duration;

use attendance_chart::error::FetchError;
use attendance_chart::session::{Session, SessionView, FETCH_FAILURE_MESSAGE};
use attendance_chart::source::{DataSource, HttpSource, SourceConfig};
use httpmock::prelude::*;
use serde_json::json;

fn config_for(server: &MockServer) -> SourceConfig {
    let mut config = SourceConfig::new(server.base_url());
    config.timeout = Duration::from_secs(2);
    config
}

#[tokio::test]
async fn fetches_roster_and_logs_from_endpoints() {
    let server = MockServer::start_async().await;

    let students = server
        .mock_async(|when, then| {
            when.method(GET).path("/students");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([
                    {"id": 1, "name": "Avery Lee"},
                    {"id": 2, "name": "Jules Moreno"}
                ]));
        })
        .await;
    let attendance = server
        .mock_async(|when, then| {
            when.method(GET).path("/attendance");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([
                    {"date": "2025-05-01", "present": [1]},
                    {"date": "2025-05-02", "present": [1, 2]}
                ]));
        })
        .await;

    let source = HttpSource::try_new(&config_for(&server)).expect("client builds");
    let roster = source.fetch_roster().await.expect("roster fetched");
    let logs = source.fetch_logs().await.expect("logs fetched");

    students.assert_async().await;
    attendance.assert_async().await;
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[1].name, "Jules Moreno");
    assert_eq!(logs[1].present_ids, vec![1, 2]);
}

#[tokio::test]
async fn non_success_status_is_a_fetch_failure() {
    let server = MockServer::start_async().await;

    let _students = server
        .mock_async(|when, then| {
            when.method(GET).path("/students");
            then.status(500).body("boom");
        })
        .await;

    let source = HttpSource::try_new(&config_for(&server)).expect("client builds");
    let error = source.fetch_roster().await.expect_err("500 is a failure");

    assert_eq!(error.status(), Some(500));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start_async().await;

    let _attendance = server
        .mock_async(|when, then| {
            when.method(GET).path("/attendance");
            then.status(200).body("{\"date\": \"2025-05-01\"}");
        })
        .await;

    let source = HttpSource::try_new(&config_for(&server)).expect("client builds");
    let error = source.fetch_logs().await.expect_err("object is not an array");

    assert!(matches!(error, FetchError::Decode { .. }));
}

#[tokio::test]
async fn one_failed_endpoint_fails_the_whole_session() {
    let server = MockServer::start_async().await;

    let _students = server
        .mock_async(|when, then| {
            when.method(GET).path("/students");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"id": 1, "name": "Avery Lee"}]));
        })
        .await;
    let _attendance = server
        .mock_async(|when, then| {
            when.method(GET).path("/attendance");
            then.status(404);
        })
        .await;

    let source = HttpSource::try_new(&config_for(&server)).expect("client builds");
    let mut session = Session::new();
    session.load(&source).await;

    assert_eq!(
        session.view(),
        SessionView::Failed {
            message: FETCH_FAILURE_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn custom_paths_are_honoured() {
    let server = MockServer::start_async().await;

    let students = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/roster");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        })
        .await;

    let mut config = config_for(&server);
    config.roster_path = "api/v2/roster".to_string();
    let source = HttpSource::try_new(&config).expect("client builds");
    let roster = source.fetch_roster().await.expect("roster fetched");

    students.assert_async().await;
    assert!(roster.is_empty());
}
