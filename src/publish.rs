use std::path::Path;

use anyhow::{Context, Result};

/// Writes the feed, creating parent directories as needed.
pub fn write_feed(path: &Path, xml: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    std::fs::write(path, xml).with_context(|| format!("writing feed to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs/feeds/rss.xml");
        write_feed(&path, "<rss/>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss/>");
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rss.xml");
        write_feed(&path, "old").unwrap();
        write_feed(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
