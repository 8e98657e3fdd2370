use crate::cmd::open_handover;
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let view = handover.view().context("failed to fetch tickets")?;

    if json {
        return print_json(&view);
    }

    if view.is_empty() {
        println!("No pending tickets.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = view
        .iter()
        .enumerate()
        .map(|(i, t)| {
            vec![
                (i + 1).to_string(),
                t.key.clone(),
                truncate(&t.summary, 50),
                t.status.clone(),
                t.action.clone(),
            ]
        })
        .collect();
    print_table(&["#", "KEY", "SUMMARY", "STATUS", "ACTION"], &rows);
    Ok(())
}
