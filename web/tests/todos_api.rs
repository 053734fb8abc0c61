//! HTTP boundary tests over the in-memory record store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::http::StatusCode;
use axum_test::TestServer;
use checkmark_core::todo::{DeletedCount, Todo, TodoId};
use checkmark_testing::{test_clock, InMemoryTodoRepository, SequentialIdGenerator};
use checkmark_web::{todo_router, AppState, CORRELATION_ID_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;

const TODAY: &str = "Wed Jan 01 2025";

fn todo(id: i64, label: &str, checked: bool) -> Todo {
    Todo::new(TodoId::new(id), label, TODAY).with_checked(checked)
}

fn server_with(repository: InMemoryTodoRepository, first_id: i64) -> TestServer {
    let state = AppState::new(
        Arc::new(repository),
        Arc::new(SequentialIdGenerator::starting_at(first_id)),
        Arc::new(test_clock()),
    );
    TestServer::new(todo_router(state)).expect("Failed to start test server")
}

fn server(records: Vec<Todo>) -> (TestServer, InMemoryTodoRepository) {
    let repository = InMemoryTodoRepository::with_records(records);
    (server_with(repository.clone(), 100), repository)
}

fn assert_error(body: &Value, code: &str, message: &str) {
    assert_eq!(body["code"], code);
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn list_returns_records_in_id_order() {
    let (server, _) = server(vec![todo(2, "b", true), todo(1, "a", false)]);

    let response = server.get("/todos").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Vec<Todo>>(),
        vec![todo(1, "a", false), todo(2, "b", true)]
    );
}

#[tokio::test]
async fn list_on_empty_store_is_an_empty_array() {
    let (server, _) = server(vec![]);

    let response = server.get("/todos").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn get_by_id() {
    let (server, _) = server(vec![todo(1, "a", false)]);

    let found = server.get("/todos/1").await;
    assert_eq!(found.status_code(), StatusCode::OK);
    assert_eq!(found.json::<Todo>(), todo(1, "a", false));

    let missing = server.get("/todos/2").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_error(&missing.json(), "NOT_FOUND", "Todo with id 2 not found");
}

#[tokio::test]
async fn create_with_label_only_fills_defaults() {
    let (server, repository) = server(vec![]);

    let response = server.post("/todos").json(&json!({"label": "Buy milk"})).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Todo>(), todo(100, "Buy milk", false));
    assert_eq!(repository.snapshot(), vec![todo(100, "Buy milk", false)]);
}

#[tokio::test]
async fn create_keeps_caller_fields() {
    let (server, _) = server(vec![]);

    let response = server
        .post("/todos")
        .json(&json!({"id": 7, "label": "x", "date": "Mon Oct 19 2026", "checked": true}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(
        response.json::<Todo>(),
        Todo::new(TodoId::new(7), "x", "Mon Oct 19 2026").with_checked(true)
    );
}

#[tokio::test]
async fn create_with_taken_id_is_a_conflict() {
    let (server, repository) = server(vec![todo(7, "original", false)]);

    let response = server
        .post("/todos")
        .json(&json!({"id": 7, "label": "impostor"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_error(&response.json(), "CONFLICT", "Todo with id 7 already exists");
    assert_eq!(repository.snapshot(), vec![todo(7, "original", false)]);
}

#[tokio::test]
async fn create_skips_synthesized_ids_that_are_taken() {
    let repository = InMemoryTodoRepository::with_records(vec![todo(1, "a", false)]);
    let server = server_with(repository, 1);

    let response = server.post("/todos").json(&json!({"label": "b"})).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Todo>().id, TodoId::new(2));
}

#[tokio::test]
async fn create_gives_up_after_three_taken_ids() {
    let repository = InMemoryTodoRepository::with_records(vec![
        todo(1, "a", false),
        todo(2, "b", false),
        todo(3, "c", false),
    ]);
    let server = server_with(repository.clone(), 1);

    let response = server.post("/todos").json(&json!({"label": "d"})).await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(repository.len(), 3);
}

#[tokio::test]
async fn create_rejects_invalid_bodies() {
    let (server, repository) = server(vec![]);

    for (body, message) in [
        (json!({}), "Missing or invalid 'label'"),
        (json!({"label": ""}), "Missing or invalid 'label'"),
        (json!({"label": 5}), "Missing or invalid 'label'"),
        (json!({"label": "x", "id": "5"}), "Invalid 'id' field"),
        (json!({"label": "x", "checked": "no"}), "Invalid 'checked' field"),
        (json!(["label"]), "Request body must be a JSON object"),
    ] {
        let response = server.post("/todos").json(&body).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{body}");
        assert_error(&response.json(), "BAD_REQUEST", message);
    }
    assert!(repository.is_empty());
}

#[tokio::test]
async fn create_without_a_json_body_is_a_bad_request() {
    let (server, _) = server(vec![]);

    let empty = server.post("/todos").await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(empty.json::<Value>()["code"], "BAD_REQUEST");

    let text = server.post("/todos").text("{not json").await;
    assert_eq!(text.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_all_checked_returns_every_record() {
    let (server, _) = server(vec![todo(1, "a", false), todo(2, "b", true)]);

    let response = server.patch("/todos").json(&json!({"checked": true})).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Vec<Todo>>(),
        vec![todo(1, "a", true), todo(2, "b", true)]
    );
}

#[tokio::test]
async fn set_all_checked_requires_a_boolean() {
    let (server, repository) = server(vec![todo(1, "a", false)]);

    let response = server.patch("/todos").json(&json!({"checked": "yes"})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_error(
        &response.json(),
        "BAD_REQUEST",
        "Missing or invalid 'checked' field",
    );
    assert_eq!(repository.snapshot(), vec![todo(1, "a", false)]);
}

#[tokio::test]
async fn set_checked_by_id() {
    let (server, _) = server(vec![todo(1, "a", false)]);

    let response = server.patch("/todos/1").json(&json!({"checked": true})).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Todo>(), todo(1, "a", true));

    let again = server.patch("/todos/1").json(&json!({"checked": true})).await;
    assert_eq!(again.json::<Todo>(), todo(1, "a", true));
}

#[tokio::test]
async fn set_checked_on_unknown_id_is_not_found() {
    let (server, repository) = server(vec![todo(1, "a", false)]);

    let response = server.patch("/todos/2").json(&json!({"checked": true})).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_error(&response.json(), "NOT_FOUND", "Todo with id 2 not found");
    assert_eq!(repository.snapshot(), vec![todo(1, "a", false)]);
}

#[tokio::test]
async fn set_checked_validates_before_looking_up() {
    let (server, _) = server(vec![]);

    let response = server.patch("/todos/2").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_by_id() {
    let (server, repository) = server(vec![todo(1, "a", false)]);

    let response = server.delete("/todos/1").await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(repository.is_empty());

    let again = server.delete("/todos/1").await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_checked_reports_count() {
    let (server, repository) = server(vec![
        todo(1, "a", true),
        todo(2, "b", false),
        todo(3, "c", true),
    ]);

    let response = server.delete("/todos").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<DeletedCount>(), DeletedCount { deleted: 2 });
    assert_eq!(repository.snapshot(), vec![todo(2, "b", false)]);
}

#[tokio::test]
async fn invalid_path_ids_are_rejected_before_the_store() {
    let (server, repository) = server(vec![]);
    repository.set_unavailable(true);

    for (path, raw) in [("/todos/abc", "abc"), ("/todos/1.5", "1.5"), ("/todos/", "")] {
        let response = server.get(path).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{path}");
        assert_error(
            &response.json(),
            "BAD_REQUEST",
            &format!("Invalid todo id: \"{raw}\""),
        );
    }

    let overflow = server.delete("/todos/99999999999999999999").await;
    assert_eq!(overflow.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unavailable_store_is_503() {
    let (server, repository) = server(vec![todo(1, "a", false)]);
    repository.set_unavailable(true);

    let response = server.get("/todos").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn health_endpoints() {
    let (server, repository) = server(vec![]);

    let live = server.get("/health").await;
    assert_eq!(live.status_code(), StatusCode::OK);
    assert_eq!(live.text(), "ok");

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    assert_eq!(ready.json::<Value>()["status"], "ready");

    repository.set_unavailable(true);
    let not_ready = server.get("/health/ready").await;
    assert_eq!(not_ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(not_ready.json::<Value>()["status"], "unavailable");
}

#[tokio::test]
async fn responses_carry_a_correlation_id() {
    let (server, _) = server(vec![]);

    let response = server.get("/todos").await;

    let header = response.header(CORRELATION_ID_HEADER);
    assert!(uuid_like(header.to_str().unwrap()));
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}
