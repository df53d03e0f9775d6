use axum::Json;
use serde_json::{json, Value};

/// GET /api/health
/// Liveness probe; answers even when the upload feature is disabled.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}
