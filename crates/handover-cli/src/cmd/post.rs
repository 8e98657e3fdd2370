use crate::cmd::{ensure_posted, open_handover};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let posted = handover.post_saved().context("failed to fetch tickets")?;

    if json {
        print_json(&serde_json::json!({ "posted": posted }))?;
    } else if posted {
        println!("Posted handover to Slack");
    }
    ensure_posted(Some(posted))
}
