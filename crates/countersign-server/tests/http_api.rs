//! Integration tests for the Countersign HTTP API.
//!
//! Drives the full router over an in-memory store, end to end: document
//! creation, code verification for all three capabilities, both party
//! signatures, write-once rejection, and the section flow.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use countersign_core::{DocumentService, SectionService};
use countersign_server::routes::app_router;
use countersign_server::state::AppState;
use countersign_storage::{DocumentStore, MemoryStore};

fn app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState {
        documents: DocumentService::new(Arc::clone(&store)),
        sections: SectionService::new(store),
    });
    app_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(payload) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn lease_payload() -> Value {
    json!({
        "title": "Lease",
        "content": "Terms of the lease.",
        "party1_name": "A",
        "party1_code": "111",
        "party2_name": "B",
        "party2_code": "222",
        "view_code": "999"
    })
}

async fn create_lease(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/documents", Some(lease_payload())).await;
    assert_eq!(status, StatusCode::OK);
    body["document"]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_rejects_missing_field() {
    let app = app();
    let mut payload = lease_payload();
    payload.as_object_mut().unwrap().remove("view_code");

    let (status, body) = send(&app, "POST", "/documents", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("view_code"));
}

#[tokio::test]
async fn created_document_never_exposes_codes() {
    let app = app();
    let (status, body) = send(&app, "POST", "/documents", Some(lease_payload())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["status"], "unsigned");
    let document = body["document"].as_object().unwrap();
    assert!(!document.contains_key("party1_code"));
    assert!(!document.contains_key("party2_code"));
    assert!(!document.contains_key("view_code"));
}

#[tokio::test]
async fn full_two_party_signing_scenario() {
    let app = app();
    let id = create_lease(&app).await;

    // Party 1 verifies with their code.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/verify"),
        Some(json!({"code": "111"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["party"], "party1");
    assert_eq!(body["party_name"], "A");
    // Pre-signing, a party response carries no signature payloads.
    assert!(body["document"].get("party1_signature").is_none());

    // Party 1 signs.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/sign"),
        Some(json!({"party": "party1", "signature": "<img1>", "full_name": "Alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "partially_signed");
    assert_eq!(body["document"]["party1_full_name"], "Alice");

    // Party 2 verifies and signs.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/verify"),
        Some(json!({"code": "222"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["party"], "party2");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/sign"),
        Some(json!({"party": "party2", "signature": "<img2>"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "fully_signed");

    // A further sign attempt for party1 fails with already-signed.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/sign"),
        Some(json!({"party": "party1", "signature": "<late>"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already signed"));

    // The first image is untouched.
    let (status, body) = send(&app, "GET", &format!("/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"]["party1_signature"], "<img1>");
}

#[tokio::test]
async fn view_code_returns_read_only_bundle_at_any_stage() {
    let app = app();
    let id = create_lease(&app).await;

    // Unsigned stage: view verify already includes both (null) signature slots.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/verify"),
        Some(json!({"code": "999"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["view_only"], true);
    assert!(body["document"]["party1_signature"].is_null());

    send(
        &app,
        "POST",
        &format!("/documents/{id}/sign"),
        Some(json!({"party": "party1", "signature": "<img1>"})),
    )
    .await;

    // Partially signed stage: the recorded signature is visible.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/verify"),
        Some(json!({"code": "999"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view_only"], true);
    assert_eq!(body["document"]["party1_signature"], "<img1>");
    assert_eq!(body["status"], "partially_signed");
    // A view response names no party — it grants no signing rights.
    assert!(body.get("party").is_none());
}

#[tokio::test]
async fn bogus_code_is_unauthorized_without_state_change() {
    let app = app();
    let id = create_lease(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/documents/{id}/verify"),
        Some(json!({"code": "bogus"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);

    let (status, body) = send(&app, "GET", &format!("/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unsigned");
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let app = app();
    let missing = "00000000-0000-0000-0000-000000000000";

    let (status, _) = send(&app, "GET", &format!("/documents/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/documents/{missing}/verify"),
        Some(json!({"code": "111"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/documents/{missing}/sign"),
        Some(json!({"party": "party1", "signature": "<img>"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_shows_summaries_newest_first() {
    let app = app();
    let first = create_lease(&app).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_lease(&app).await;

    send(
        &app,
        "POST",
        &format!("/documents/{first}/sign"),
        Some(json!({"party": "party1", "signature": "<img>"})),
    )
    .await;

    let (status, body) = send(&app, "GET", "/documents", None).await;
    assert_eq!(status, StatusCode::OK);

    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["id"], second.as_str());
    assert_eq!(documents[1]["id"], first.as_str());
    assert_eq!(documents[1]["party1_signed"], true);
    assert_eq!(documents[1]["party2_signed"], false);
    assert_eq!(documents[1]["status"], "partially_signed");

    // Summaries leak neither code fields nor signature payloads.
    let raw = body.to_string();
    assert!(!raw.contains("party1_code"));
    assert!(!raw.contains("view_code"));
    assert!(!raw.contains("<img>"));
}

#[tokio::test]
async fn delete_removes_the_document_and_is_idempotent() {
    let app = app();
    let id = create_lease(&app).await;

    let (status, body) = send(&app, "DELETE", &format!("/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, "GET", &format!("/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Repeating the delete still reports success.
    let (status, body) = send(&app, "DELETE", &format!("/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn section_flow_is_write_once() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/sections/verify-code",
        Some(json!({"section_id": "section1", "code": "open-sesame"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let code_hash = body["code_hash"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        "POST",
        "/sections/sign",
        Some(json!({
            "section_id": "section1",
            "code_hash": code_hash,
            "signature_data": "<img>"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["signature"]["section_id"], "section1");
    assert_eq!(body["signature"]["is_signed"], true);

    // The section is closed now, for both verify and save.
    let (status, _) = send(
        &app,
        "POST",
        "/sections/verify-code",
        Some(json!({"section_id": "section1", "code": "open-sesame"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/sections/sign",
        Some(json!({
            "section_id": "section1",
            "code_hash": "whatever",
            "signature_data": "<other>"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The other section is unaffected.
    let (status, _) = send(
        &app,
        "POST",
        "/sections/verify-code",
        Some(json!({"section_id": "section2", "code": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sign_records_forwarded_client_address() {
    let app = app();
    let id = create_lease(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/documents/{id}/sign"))
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(
            json!({"party": "party1", "signature": "<img>"}).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["document"]["party1_ip"], "203.0.113.7");
}
