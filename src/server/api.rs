use super::*;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

/// Body of `POST /context`. Fields are optional here so that a missing one
/// is reported by name instead of as a generic decoding error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    pub sql: Option<String>,
    pub position: Option<CaretPosition>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub context: SqlContext,
}

pub(super) async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub(super) async fn post_context(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<ContextRequest>, JsonRejection>,
) -> Result<Json<ContextResponse>> {
    let result = compute(&state, request).await;
    match &result {
        Ok(_) => {}
        Err(e) if e.status().is_client_error() => warn!("Rejected context request: {e}"),
        Err(e) => error!("Context request failed: {e}"),
    }
    result
}

async fn compute(
    state: &AppState,
    request: std::result::Result<Json<ContextRequest>, JsonRejection>,
) -> Result<Json<ContextResponse>> {
    let Json(request) = request.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let sql = request
        .sql
        .ok_or_else(|| Error::InvalidRequest("missing field `sql`".into()))?;
    let position = request
        .position
        .ok_or_else(|| Error::InvalidRequest("missing field `position`".into()))?;

    info!("Context at {position}: {}", visualize_cursor(&sql, position));
    let context = state
        .service
        .context(&sql, position, request.language.as_deref())
        .await?;
    debug!(
        "Answered {} suggestions for\n{}",
        context.suggestions.len(),
        format_with_line_numbers(&sql, position)
    );
    Ok(Json(ContextResponse { context }))
}
