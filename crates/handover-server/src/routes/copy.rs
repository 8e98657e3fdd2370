use axum::{extract::State, Json};

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/handover-copy: plain-text handover for the clipboard
pub async fn handover_copy(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let text = blocking(&app, |h| h.copy_text()).await?;
    Ok(Json(serde_json::json!({ "text": text })))
}
