//! Handler tests for the web UI, driven through the full router.

use architect::web_server::build_router_with_api_bases;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Router wired to vendor endpoints that must never be reached.
fn test_server(folder: PathBuf) -> TestServer {
    test_server_with_bases(folder, "http://unreachable.invalid", "http://unreachable.invalid")
}

fn test_server_with_bases(folder: PathBuf, openai: &str, github: &str) -> TestServer {
    TestServer::new(build_router_with_api_bases(
        folder,
        openai.to_string(),
        github.to_string(),
    ))
    .unwrap()
}

#[test_log::test(tokio::test)]
async fn test_index_renders_page() {
    let temp = tempdir().unwrap();
    let server = test_server(temp.path().join("admin_tools"));

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Architect"));
    assert!(html.contains("gpt-4o"));
    assert!(html.contains("Deploy blueprint to GitHub"));
}

#[test_log::test(tokio::test)]
async fn test_empty_message_is_rejected_without_touching_history() {
    let temp = tempdir().unwrap();
    let server = test_server(temp.path().join("admin_tools"));

    let response = server
        .post("/api/message")
        .json(&json!({ "message": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please enter a message before sending");

    let history: Value = server.get("/api/history").await.json();
    assert_eq!(history["history"].as_array().unwrap().len(), 0);
}

#[test_log::test(tokio::test)]
async fn test_message_round_trip_and_clear() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Sounds good." } }]
        })))
        .mount(&mock)
        .await;

    let temp = tempdir().unwrap();
    let server = test_server_with_bases(
        temp.path().join("admin_tools"),
        &mock.uri(),
        "http://unreachable.invalid",
    );

    let response = server
        .post("/api/message")
        .json(&json!({ "message": "Plan the rollout", "api_key": "sk-test" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["reply"], "Sounds good.");

    // Both sides of the exchange land in the transcript, in order.
    let history: Value = server.get("/api/history").await.json();
    let entries = history["history"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["role"], "user");
    assert_eq!(entries[0]["content"], "Plan the rollout");
    assert_eq!(entries[1]["role"], "assistant");
    assert_eq!(entries[1]["content"], "Sounds good.");

    server.post("/api/clear").await.assert_status_ok();
    let history: Value = server.get("/api/history").await.json();
    assert_eq!(history["history"].as_array().unwrap().len(), 0);
}

#[test_log::test(tokio::test)]
async fn test_blueprint_build_and_download() {
    let temp = tempdir().unwrap();
    let folder = temp.path().join("admin_tools");
    fs::create_dir_all(folder.join("sub")).unwrap();
    fs::write(folder.join("a.txt"), "hi").unwrap();
    fs::write(folder.join("sub").join("b.bin"), [0xffu8, 0xfe, 0x00]).unwrap();

    let server = test_server(folder);

    // Nothing to download before the first build.
    let response = server.get("/api/blueprint/download").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.post("/api/blueprint").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["files"], 1);
    assert!(body["preview"]
        .as_str()
        .unwrap()
        .contains("admin_tools/a.txt"));

    let history: Value = server.get("/api/history").await.json();
    assert_eq!(history["blueprint_files"], 1);

    let response = server.get("/api/blueprint/download").await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"admin_tools_blueprint.json\""
    );
    assert!(response.text().contains("\"admin_tools/a.txt\": \"hi\""));
}

#[test_log::test(tokio::test)]
async fn test_deploy_requires_a_built_blueprint() {
    let temp = tempdir().unwrap();
    let server = test_server(temp.path().join("admin_tools"));

    let response = server
        .post("/api/deploy")
        .json(&json!({ "token": "t0k3n", "repo": "owner/repo" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Build a blueprint first");
}

#[test_log::test(tokio::test)]
async fn test_deploy_publishes_built_blueprint() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/contents/admin_tools_blueprint.json"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
        )
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/owner/repo/contents/admin_tools_blueprint.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "content": {} })))
        .expect(1)
        .mount(&mock)
        .await;

    let temp = tempdir().unwrap();
    let folder = temp.path().join("admin_tools");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("a.txt"), "hi").unwrap();

    let server =
        test_server_with_bases(folder, "http://unreachable.invalid", &mock.uri());
    server.post("/api/blueprint").await.assert_status_ok();

    let response = server
        .post("/api/deploy")
        .json(&json!({ "token": "t0k3n", "repo": "owner/repo" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deployed"], true);
}

#[test_log::test(tokio::test)]
async fn test_deploy_reports_remote_failures_as_gateway_errors() {
    let temp = tempdir().unwrap();
    let folder = temp.path().join("admin_tools");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("a.txt"), "hi").unwrap();

    let server = test_server(folder);
    server.post("/api/blueprint").await.assert_status_ok();

    // Empty repo is caught by the publisher's precondition check.
    let response = server
        .post("/api/deploy")
        .json(&json!({ "token": "t0k3n", "repo": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Repo name is missing");
}
