use axum::{extract::State, Json};
use handover_core::workflow::TicketView;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/tickets: fetched tickets with their saved status and action
pub async fn list_tickets(State(app): State<AppState>) -> Result<Json<Vec<TicketView>>, AppError> {
    let view = blocking(&app, |h| h.view()).await?;
    Ok(Json(view))
}
