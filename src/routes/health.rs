use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health — reports which collaborators are wired; does not touch the store
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.plans.backend_tag().unwrap_or("not connected");
    let advice = if state.advice.is_configured() {
        "configured"
    } else {
        "not configured"
    };
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "store": store, "advice": advice })),
    )
}
