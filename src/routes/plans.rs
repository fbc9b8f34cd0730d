use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::plan::{CreatePlanRequest, UpdatePlanRequest},
    services::{
        plans::PlanError,
        validation::{is_full_week, validate_plan as find_violations},
    },
    AppState,
};

fn plan_error(e: PlanError) -> (StatusCode, Json<Value>) {
    match e {
        PlanError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))),
        PlanError::ValidationFailed(violations) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "Invalid entries found! Remove numbers or special characters; plan NOT saved.",
                "violations": violations,
            })),
        ),
        e @ PlanError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        ),
        e @ PlanError::StorageUnavailable(_) => {
            tracing::error!("Plan store error: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /plans — id → {child_name, age}; `{}` when nothing is saved
pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .plans
        .list()
        .await
        .map(|summaries| Json(json!(summaries)))
        .map_err(plan_error)
}

/// POST /plans
pub async fn create_plan(
    State(state): State<AppState>,
    Json(body): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .plans
        .create(body)
        .await
        .map(|plan| (StatusCode::CREATED, Json(json!(plan))))
        .map_err(plan_error)
}

/// POST /plans/validate — dry run, nothing is written
pub async fn validate_plan(Json(body): Json<UpdatePlanRequest>) -> Json<Value> {
    let violations = find_violations(&body.days);
    Json(json!({
        "valid": violations.is_empty() && is_full_week(&body.days),
        "complete_week": is_full_week(&body.days),
        "violations": violations,
    }))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .plans
        .get(&id)
        .await
        .map(|plan| Json(json!(plan)))
        .map_err(plan_error)
}

/// PUT /plans/{id} — replaces the whole week
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlanRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .plans
        .update(&id, body.days)
        .await
        .map(|plan| Json(json!(plan)))
        .map_err(plan_error)
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .plans
        .delete(&id)
        .await
        .map(|_| Json(json!({ "message": "Plan deleted" })))
        .map_err(plan_error)
}
