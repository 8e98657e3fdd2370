use crate::cmd::{ensure_posted, open_handover};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, status: &str, action: &str, post: bool, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let outcome = handover
        .fill_all(status, action, post)
        .context("failed to fill tickets")?;

    if json {
        print_json(&serde_json::json!({
            "saved": outcome.store.len(),
            "posted": outcome.posted,
        }))?;
    } else {
        println!(
            "Saved {} ticket(s) to {}",
            outcome.store.len(),
            handover.store_path().display()
        );
        if outcome.posted == Some(true) {
            println!("Posted handover to Slack");
        }
    }
    ensure_posted(outcome.posted)
}
