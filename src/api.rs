//! REST API server for the expense ledger
//!
//! Exposes extraction, the ledger and its summary over HTTP

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::classifier::Classifier;
use crate::display::{format_won, format_won_signed};
use crate::error::LedgerError;
use crate::state::SharedSession;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractRequest {
    pub utterance: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub session: SharedSession,
    pub classifier: Arc<dyn Classifier>,
    pub timeout: Option<Duration>,
}

fn status_for(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::Busy => StatusCode::CONFLICT,
        LedgerError::EmptyUtterance => StatusCode::BAD_REQUEST,
        LedgerError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        e if e.is_service_failure() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON numbers stop at u64; larger totals go out as decimal strings
fn amount_value(total: u128) -> serde_json::Value {
    u64::try_from(total)
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::String(total.to_string()))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Extraction Endpoint
/// =============================

async fn extract(
    State(state): State<ApiState>,
    Json(req): Json<ExtractRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received extraction request: {}", req.utterance);

    match state
        .session
        .extract(state.classifier.clone(), &req.utterance, state.timeout)
        .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "record": record,
                "display_amount": format_won(u128::from(record.amount())),
            }))),
        ),
        Err(e) => (status_for(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// =============================
/// Ledger / Summary Endpoints
/// =============================

async fn ledger(State(state): State<ApiState>) -> Json<ApiResponse> {
    let records = state
        .session
        .with(|s| serde_json::to_value(s.ledger()).unwrap_or_default())
        .await;

    Json(ApiResponse::success(records))
}

async fn summary(State(state): State<ApiState>) -> Json<ApiResponse> {
    let summary = state.session.with(|s| s.summary()).await;

    let by_category: Vec<serde_json::Value> = summary
        .by_category
        .iter()
        .map(|t| {
            serde_json::json!({
                "category": t.category,
                "total": amount_value(t.total),
                "display": format_won(t.total),
            })
        })
        .collect();

    Json(ApiResponse::success(serde_json::json!({
        "total_income": amount_value(summary.total_income),
        "total_expense": amount_value(summary.total_expense),
        "net": summary.net.to_string(),
        "display": {
            "total_income": format_won(summary.total_income),
            "total_expense": format_won(summary.total_expense),
            "net": format_won_signed(summary.net),
        },
        "by_category": by_category,
    })))
}

async fn session(State(state): State<ApiState>) -> Json<ApiResponse> {
    let data = state
        .session
        .with(|s| {
            serde_json::json!({
                "busy": s.is_busy(),
                "ledger_len": s.ledger().len(),
                "last_outcome": s.last_outcome(),
                "categories": s.taxonomy().categories(),
            })
        })
        .await;

    Json(ApiResponse::success(data))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/extract", post(extract))
        .route("/api/ledger", get(ledger))
        .route("/api/summary", get(summary))
        .route("/api/session", get(session))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
