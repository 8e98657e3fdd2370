use axum::{extract::State, Json};
use handover_core::edits;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

type Form = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// POST /save: replace the store with the submitted form state
pub async fn save(
    State(app): State<AppState>,
    Json(form): Json<Form>,
) -> Result<Json<serde_json::Value>, AppError> {
    let edits = edits::from_form(&form)?;
    blocking(&app, move |h| h.submit(edits, false)).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// ---------------------------------------------------------------------------
// Save and post
// ---------------------------------------------------------------------------

/// POST /save-and-post: save, then post the saved tickets to Slack.
/// A failed post is a 502; the save is kept.
pub async fn save_and_post(
    State(app): State<AppState>,
    Json(form): Json<Form>,
) -> Result<Json<serde_json::Value>, AppError> {
    let edits = edits::from_form(&form)?;
    let outcome = blocking(&app, move |h| h.submit(edits, true)).await?;
    if outcome.posted != Some(true) {
        return Err(AppError::post_failed());
    }
    Ok(Json(serde_json::json!({ "success": true })))
}
