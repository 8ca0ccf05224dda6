use axum::Json;
use serde_json::json;

pub mod hubspot;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "integration-service"
    }))
}
