use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    models::bmi::BmiRequest,
    services::{
        bmi::{classify, tips_prompt},
        metrics::BMI_COUNTER,
    },
    AppState,
};

/// POST /bmi — classify a reading; with `tips: true` also asks the advice service
pub async fn calculate(
    State(state): State<AppState>,
    Json(body): Json<BmiRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let reading = classify(body.weight_kg, body.height_cm).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
    })?;
    BMI_COUNTER.with_label_values(&[reading.label]).inc();

    let mut response = json!(reading);
    if body.tips {
        response["tips"] = json!(state.advice.complete(&tips_prompt(&reading)).await);
    }
    Ok(Json(response))
}
