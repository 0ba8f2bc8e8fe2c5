use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock as TokioRwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::ScanReport;
use crate::stats::ScanStats;

/// Latest published results. Written only by the scan loop.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub last_report: Option<ScanReport>,
    pub stats: ScanStats,
}

pub type SharedAppState = Arc<TokioRwLock<AppState>>;

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scan", get(latest_scan))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /scan
pub async fn latest_scan(State(shared_state): State<SharedAppState>) -> (StatusCode, Json<Value>) {
    let guard = shared_state.read().await;
    match &guard.last_report {
        Some(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "count": report.opportunities.len(),
                "report": report,
            })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "pending", "message": "no scan completed yet" })),
        ),
    }
}

/// GET /stats
pub async fn stats(State(shared_state): State<SharedAppState>) -> Json<ScanStats> {
    Json(shared_state.read().await.stats.clone())
}
