use crate::error::{HandoverError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const STORE_FILE: &str = "ticket_data.json";
pub const EDIT_FILE: &str = "edit_tickets.json";

pub const LAUNCH_AGENTS_DIR: &str = "Library/LaunchAgents";
pub const LAUNCH_AGENT_LABEL: &str = "com.handover.lazyhand";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

pub fn edit_path(root: &Path) -> PathBuf {
    root.join(EDIT_FILE)
}

/// `~/Library/LaunchAgents/com.handover.lazyhand.plist`
pub fn launch_agent_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(HandoverError::HomeNotFound)?;
    Ok(home
        .join(LAUNCH_AGENTS_DIR)
        .join(format!("{LAUNCH_AGENT_LABEL}.plist")))
}

/// Join `base` and `/browse/<key>` without doubling the slash.
pub fn browse_url(base: &str, key: &str) -> String {
    format!("{}/browse/{key}", base.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/handover");
        assert_eq!(
            store_path(root),
            PathBuf::from("/tmp/handover/ticket_data.json")
        );
        assert_eq!(
            edit_path(root),
            PathBuf::from("/tmp/handover/edit_tickets.json")
        );
    }

    #[test]
    fn browse_url_trims_trailing_slash() {
        assert_eq!(
            browse_url("https://acme.atlassian.net/", "TCP-1"),
            "https://acme.atlassian.net/browse/TCP-1"
        );
        assert_eq!(
            browse_url("https://acme.atlassian.net", "TCP-1"),
            "https://acme.atlassian.net/browse/TCP-1"
        );
    }
}
