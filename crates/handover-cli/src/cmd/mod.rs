pub mod check;
pub mod edit;
pub mod fill;
pub mod list;
pub mod post;
pub mod report;
pub mod schedule;
pub mod serve;

use anyhow::Context;
use handover_core::config::Config;
use handover_core::workflow::Handover;
use std::path::Path;

/// Read configuration from the environment and open the handover at `root`.
pub fn open_handover(root: &Path) -> anyhow::Result<Handover> {
    let config = Config::from_env().context("failed to load configuration")?;
    Handover::new(config, root).context("failed to initialise Jira client")
}

/// A requested post that failed becomes a non-zero exit. The store is already
/// saved at this point; the delivery error was logged by the core.
pub fn ensure_posted(posted: Option<bool>) -> anyhow::Result<()> {
    if posted == Some(false) {
        anyhow::bail!("failed to post handover to Slack");
    }
    Ok(())
}
