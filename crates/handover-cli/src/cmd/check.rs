use crate::cmd::open_handover;
use crate::output::print_json;
use anyhow::Context;
use handover_core::config::WarnLevel;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let handover = open_handover(root)?;
    let warnings = handover.config().validate();
    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    let user = handover
        .jira()
        .myself()
        .context("failed to authenticate with Jira")?;
    let count = handover
        .fetch_tickets()
        .context("failed to run the ticket query")?
        .len();

    if json {
        print_json(&serde_json::json!({
            "jira_user": user,
            "tickets": count,
            "warnings": warnings,
        }))?;
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
        println!("Connected to {} as {user}", handover.jira().base_url());
        println!("Query returned {count} ticket(s)");
    }

    if has_errors {
        anyhow::bail!("configuration has errors");
    }
    Ok(())
}
