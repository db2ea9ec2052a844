use axum::Json;
use serde_json::{json, Value};

/// Public liveness landing route.
pub async fn landing() -> Json<Value> {
    Json(json!({ "message": "SRM API is running!" }))
}
