use std::path::{Path, PathBuf};

/// Resolve the directory that holds the ticket store.
///
/// `--root` / `HANDOVER_ROOT` wins; otherwise the current directory.
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn falls_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_root(None), cwd);
    }
}
