//! End-to-end API scenario against the full router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use mission_control::anomaly::AnomalyRegistry;
use mission_control::api::{self, state::AppState};
use mission_control::blockchain::LedgerClient;
use mission_control::search::StaticProvider;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

fn app() -> Router {
    let state = AppState::new(
        Arc::new(AnomalyRegistry::new()),
        Arc::new(StaticProvider),
        Arc::new(LedgerClient::new("http://localhost:9545", "1", false)),
    );
    api::router(state, Duration::from_secs(5))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_detect_resolve_report_scenario() {
    let app = app();

    // Empty registry.
    let (status, list) = call(&app, Method::GET, "/api/v1/anomalies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    // Trigger detection.
    let (status, detected) = call(&app, Method::POST, "/api/v1/anomalies/detect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detected["detected"], 4);
    let anomalies = detected["anomalies"].as_array().unwrap();
    assert_eq!(anomalies.len(), 4);

    let (_, list) = call(&app, Method::GET, "/api/v1/anomalies", None).await;
    assert_eq!(list.as_array().unwrap().len(), 4);

    // Resolve the first one.
    let id = anomalies[0]["id"].as_str().unwrap().to_string();
    let (status, resolved) = call(
        &app,
        Method::POST,
        "/api/v1/anomalies/resolve",
        Some(serde_json::json!({ "id": id, "resolution": "verified" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");
    assert_eq!(resolved["anomaly_id"], id.as_str());
    assert!(resolved["blockchain_tx"]
        .as_str()
        .unwrap()
        .starts_with(&format!("0x{}", &id[..8])));

    let (status, record) = call(
        &app,
        Method::GET,
        &format!("/api/v1/anomalies/get?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "resolved");
    assert_eq!(record["resolution"], "verified");
    assert!(record["resolved_at"].is_string());

    // Report reflects the resolution.
    let (status, report) = call(&app, Method::GET, "/api/v1/anomalies/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_anomalies"], 4);
    assert_eq!(report["resolved_anomalies"], 1);
    assert_eq!(report["pending_anomalies"], 3);
    let severity_sum: u64 = report["by_severity"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(severity_sum, 4);
}

#[tokio::test]
async fn test_repeated_detection_accumulates() {
    let app = app();
    call(&app, Method::POST, "/api/v1/anomalies/detect", None).await;
    call(&app, Method::POST, "/api/v1/anomalies/detect", None).await;

    let (_, report) = call(&app, Method::GET, "/api/v1/anomalies/report", None).await;
    assert_eq!(report["total_anomalies"], 8);
    assert_eq!(report["by_type"]["dao_vote_failure"], 2);
}

#[tokio::test]
async fn test_detect_requires_post() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/anomalies/detect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
