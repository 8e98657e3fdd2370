use crate::cmd::{ensure_posted, open_handover};
use crate::output::print_json;
use anyhow::{bail, Context};
use handover_core::edits::{self, EditorDocument};
use handover_core::{io, paths};
use std::path::Path;
use std::process::Command;

const DEFAULT_EDITOR: &str = "nano";

pub fn run(root: &Path, post: bool, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let fetched = handover
        .fetch_tickets()
        .context("failed to fetch tickets")?;
    if fetched.is_empty() {
        println!("No pending tickets to edit.");
        return Ok(());
    }

    let doc = edits::editor_document(&fetched, &handover.load());
    let scratch = paths::edit_path(root);
    io::atomic_write(&scratch, serde_json::to_string_pretty(&doc)?.as_bytes())
        .with_context(|| format!("failed to write {}", scratch.display()))?;

    open_editor(&scratch)?;

    let data = std::fs::read_to_string(&scratch)
        .with_context(|| format!("failed to read {}", scratch.display()))?;
    let edited: EditorDocument = serde_json::from_str(&data)
        .with_context(|| format!("{} is not valid JSON; nothing was saved", scratch.display()))?;

    let outcome = handover
        .submit(edits::from_editor_document(&edited), post)
        .context("failed to save handover")?;
    io::remove_if_exists(&scratch)?;

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

/// Run `$EDITOR` (which may carry arguments, e.g. `code --wait`) on `path`.
fn open_editor(path: &Path) -> anyhow::Result<()> {
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_EDITOR);

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("editor '{editor}' exited with {status}; nothing was saved");
    }
    Ok(())
}
