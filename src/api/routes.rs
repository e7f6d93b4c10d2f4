//! API route definitions.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;
use crate::anomaly::{Anomaly, AnomalyFilter, AnomalyReport};
use crate::blockchain::LedgerStatus;
use crate::search::{self, SearchResponse};

const DEFAULT_SEARCH_COUNT: usize = 10;

const TAGLINE: &str =
    "Manus Copilot Integration — Controlled Innovation, Superintelligence in Motion.";

const MISSION: &str = "This repository demonstrates technical mastery with CI validation, \
while embodying the vision of coopetition — collaboration and competition intertwined. \
It integrates GitHub Copilot with Manus Blockchain, simulates anomaly detection, and applies \
a Superintelligence loop enriched by Bing Search insights. It is not just code — it is a \
mission control panel for the future of distributed intelligence and interplanetary auditability.";

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/anomalies", get(list_anomalies))
        .route("/anomalies/detect", post(detect_anomalies))
        .route("/anomalies/get", get(get_anomaly))
        .route("/anomalies/resolve", post(resolve_anomaly))
        .route("/anomalies/report", get(anomaly_report))
        .route("/anomalies/context", get(anomaly_context))
        .route("/search", get(web_search))
        .route("/blockchain/status", get(blockchain_status))
        .route("/blockchain/verify", get(verify_commit))
        .route("/tagline", get(tagline))
        .route("/mission", get(mission))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CommitQuery {
    commit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    id: String,
    #[serde(default)]
    resolution: String,
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "Manus Copilot Integration",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `?type=`, `?severity=` and `?status=` narrow the listing; all given
/// criteria must match.
async fn list_anomalies(
    State(state): State<AppState>,
    query: Result<Query<AnomalyFilter>, QueryRejection>,
) -> Result<Json<Vec<Anomaly>>, ApiError> {
    let Query(filter) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.registry.filter(&filter).await))
}

async fn detect_anomalies(State(state): State<AppState>) -> Json<Value> {
    let anomalies = state.registry.detect().await;
    Json(json!({
        "detected": anomalies.len(),
        "anomalies": anomalies,
    }))
}

async fn get_anomaly(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Anomaly>, ApiError> {
    let id = required(query.id, "anomaly ID is required")?;
    Ok(Json(state.registry.get(&id).await?))
}

async fn resolve_anomaly(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected resolve body");
        ApiError::BadRequest("invalid request body".to_string())
    })?;
    if req.id.is_empty() || req.resolution.is_empty() {
        return Err(ApiError::BadRequest(
            "id and resolution are required".to_string(),
        ));
    }

    let anomaly = state.registry.resolve(&req.id, &req.resolution).await?;
    let tx_hash = state.ledger.log_anomaly(&anomaly.id, &req.resolution);

    Ok(Json(json!({
        "status": "resolved",
        "anomaly_id": anomaly.id,
        "blockchain_tx": tx_hash,
    })))
}

async fn anomaly_report(State(state): State<AppState>) -> Json<AnomalyReport> {
    Json(state.registry.report().await)
}

async fn anomaly_context(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let id = required(query.id, "anomaly ID is required")?;
    let anomaly = state.registry.get(&id).await?;
    let context = search::anomaly_context(state.search.as_ref(), anomaly.kind).await?;
    Ok(Json(context))
}

async fn web_search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let q = required(query.q, "query parameter 'q' is required")?;
    let count = query.count.unwrap_or(DEFAULT_SEARCH_COUNT);
    Ok(Json(state.search.search(&q, count).await?))
}

async fn blockchain_status(State(state): State<AppState>) -> Json<LedgerStatus> {
    Json(state.ledger.status())
}

async fn verify_commit(
    State(state): State<AppState>,
    Query(query): Query<CommitQuery>,
) -> Result<Json<Value>, ApiError> {
    let commit = required(query.commit, "query parameter 'commit' is required")?;
    let verified = state.ledger.verify_commit(&commit);
    Ok(Json(json!({ "commit": commit, "verified": verified })))
}

async fn tagline() -> Json<Value> {
    Json(json!({ "tagline": TAGLINE }))
}

async fn mission() -> Json<Value> {
    Json(json!({ "mission": MISSION }))
}
