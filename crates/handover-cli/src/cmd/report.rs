use crate::cmd::open_handover;
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let text = handover.copy_text().context("failed to fetch tickets")?;
    if json {
        print_json(&serde_json::json!({ "text": text }))
    } else {
        println!("{text}");
        Ok(())
    }
}
