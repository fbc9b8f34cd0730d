use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{models::chat::AskRequest, AppState};

/// POST /advice — one question, one answer. Advice failures come back as the
/// answer text, never as an error status.
pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Question is empty" })),
        ));
    }

    let answer = state.advice.ask(question).await;
    Ok(Json(json!({ "answer": answer })))
}
