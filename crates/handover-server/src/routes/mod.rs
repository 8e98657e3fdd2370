pub mod copy;
pub mod health;
pub mod save;
pub mod slash;
pub mod tickets;

use crate::error::AppError;
use crate::state::AppState;
use handover_core::workflow::Handover;

/// Run `f` against the shared handover on the blocking pool. Every core call
/// does blocking HTTP and file IO, so handlers go through here.
pub(crate) async fn blocking<T, F>(app: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Handover) -> handover_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let handover = app.handover.clone();
    let result = tokio::task::spawn_blocking(move || f(&handover))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(result)
}
