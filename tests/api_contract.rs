//! HTTP contract tests for the to-do API client.
//!
//! Verifies exact wire format per operation: method, path, JSON bodies,
//! and the fail-fast error behavior on non-2xx responses.

use serde_json::json;
use taskdeck::api::{ApiClient, NewTask, TaskPatch};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Read operations ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_tasks_parses_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": 1, "id": 1, "title": "delectus aut autem", "completed": false},
            {"userId": 1, "id": 2, "title": "quis ut nam", "completed": true},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let tasks = client.list_tasks().await.expect("list should succeed");

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, 1);
    assert_eq!(tasks[0].title, "delectus aut autem");
    assert!(tasks[1].completed);
}

#[tokio::test]
async fn test_get_task_hits_singular_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"userId": 1, "id": 7, "title": "illo expedita", "completed": false}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let task = client.get_task(7).await.expect("get should succeed");
    assert_eq!(task.id, 7);
}

#[tokio::test]
async fn test_list_tasks_fails_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.list_tasks().await.expect_err("500 must fail");
    assert_eq!(err.to_string(), "failed to fetch tasks");
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_task_posts_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "Buy milk", "completed": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(
            {"id": 201, "title": "Buy milk", "completed": false}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let created = client
        .create_task(&NewTask {
            title: "Buy milk".to_string(),
            completed: false,
        })
        .await
        .expect("create should succeed");

    // The server's representation is trusted as-is.
    assert_eq!(created.id, 201);
    assert_eq!(created.title, "Buy milk");
}

// ── Update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_task_sends_only_present_fields() {
    let server = MockServer::start().await;

    // Exact body match: a patch that only flips `completed` must not carry
    // a `title` key at all.
    Mock::given(method("PATCH"))
        .and(path("/todos/1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"id": 1, "title": "A", "completed": true}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let updated = client
        .update_task(1, &TaskPatch::set_completed(true))
        .await
        .expect("update should succeed");
    assert!(updated.completed);
}

#[tokio::test]
async fn test_update_error_is_opaque() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/todos/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "no such task"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client
        .update_task(1, &TaskPatch::set_completed(true))
        .await
        .expect_err("404 must fail");

    // One undifferentiated error kind: no status code, no payload detail.
    assert_eq!(err.to_string(), "failed to update task");
    assert_eq!(err.operation(), "update task");
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_task_discards_response_body() {
    let server = MockServer::start().await;

    // The default collaborator answers deletes with an empty object, not
    // the deleted resource. The client must not care.
    Mock::given(method("DELETE"))
        .and(path("/todos/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    client.delete_task(3).await.expect("delete should succeed");
}

#[tokio::test]
async fn test_delete_task_fails_on_non_2xx() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/todos/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.delete_task(3).await.expect_err("404 must fail");
    assert_eq!(err.to_string(), "failed to delete task");
}
