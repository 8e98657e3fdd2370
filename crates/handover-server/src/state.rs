use handover_core::config::Config;
use handover_core::workflow::Handover;
use std::path::Path;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// Build it outside the async runtime: the Jira client is blocking and must
/// only be used from `spawn_blocking`.
#[derive(Clone)]
pub struct AppState {
    pub handover: Arc<Handover>,
}

impl AppState {
    pub fn new(config: Config, root: &Path) -> handover_core::Result<Self> {
        Ok(Self::from_handover(Handover::new(config, root)?))
    }

    pub fn from_handover(handover: Handover) -> Self {
        Self {
            handover: Arc::new(handover),
        }
    }
}
