//! Integration Tests for API Endpoints
//!
//! Runs audit cycles against an inventory file and checks the full
//! request/response cycle for each endpoint.

use std::io::Write;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bucket_audit::{
    api::create_router, audit::Auditor, cache::MemoCache, storage::InventoryFactory,
    tasks::run_audit_cycle, AppState, Config,
};
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

// == Helper Functions ==

const INVENTORY: &str = r#"{
  "buckets": [
    {"name": "logs", "region": "eu-west-1", "encryption": "aws:kms"},
    {"name": "legacy"},
    {"name": "assets", "region": "us-west-2", "encryption": "AES256"},
    {"name": "locked", "region": "us-west-2", "error": "AccessDenied"}
  ]
}"#;

fn write_inventory(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn create_state(inventory: &NamedTempFile) -> AppState {
    let config = Config::default();
    let factory = Arc::new(InventoryFactory::from_path(inventory.path(), "us-west-2"));
    AppState::new(Auditor::from_config(factory, &config))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Health Endpoint ==

#[tokio::test]
async fn test_health_endpoint() {
    let inventory = write_inventory(INVENTORY);
    let app = create_router(create_state(&inventory));

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

// == Report Endpoint ==

#[tokio::test]
async fn test_report_before_first_audit() {
    let inventory = write_inventory(INVENTORY);
    let app = create_router(create_state(&inventory));

    let (status, json) = get_json(app, "/report").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("No audit"));
}

#[tokio::test]
async fn test_report_after_audit() {
    let inventory = write_inventory(INVENTORY);
    let state = create_state(&inventory);
    run_audit_cycle(state.auditor.clone(), state.latest.clone())
        .await
        .unwrap();
    let app = create_router(state);

    let (status, json) = get_json(app, "/report").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_buckets"], 4);
    assert_eq!(json["encrypted"], 2);
    assert_eq!(json["unencrypted"], 1);
    assert_eq!(json["failed"], 1);

    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings[0]["bucket"], "logs");
    assert_eq!(findings[0]["region"], "eu-west-1");
    assert_eq!(findings[0]["status"]["algorithm"], "aws:kms");
    assert_eq!(findings[1]["region"], "us-east-1");
    assert_eq!(findings[1]["status"]["state"], "unencrypted");
    assert_eq!(findings[3]["status"]["state"], "failed");
}

#[tokio::test]
async fn test_failed_cycle_keeps_last_report() {
    let mut inventory = write_inventory(INVENTORY);
    let state = create_state(&inventory);
    run_audit_cycle(state.auditor.clone(), state.latest.clone())
        .await
        .unwrap();

    inventory.as_file_mut().set_len(0).unwrap();
    let broken = Arc::new(Auditor::with_caches(
        Arc::new(InventoryFactory::from_path(inventory.path(), "us-west-2")),
        MemoCache::new(None, None),
        MemoCache::new(None, None),
    ));
    assert!(run_audit_cycle(broken, state.latest.clone()).await.is_err());

    let (status, json) = get_json(create_router(state), "/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_buckets"], 4);
}

// == Stats Endpoint ==

#[tokio::test]
async fn test_stats_reflect_memoized_lookups() {
    let inventory = write_inventory(INVENTORY);
    let state = create_state(&inventory);

    run_audit_cycle(state.auditor.clone(), state.latest.clone())
        .await
        .unwrap();
    run_audit_cycle(state.auditor.clone(), state.latest.clone())
        .await
        .unwrap();

    let (status, json) = get_json(create_router(state), "/stats").await;

    assert_eq!(status, StatusCode::OK);
    // default + eu-west-1 + us-east-1 + us-west-2, each built once
    assert_eq!(json["clients"]["misses"], 4);
    assert_eq!(json["clients"]["total_entries"], 4);
    assert_eq!(json["regions"]["misses"], 4);
    assert_eq!(json["regions"]["hits"], 4);
    assert_eq!(json["regions"]["evictions"], 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let inventory = write_inventory(INVENTORY);
    let app = create_router(create_state(&inventory));

    let response = app
        .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
