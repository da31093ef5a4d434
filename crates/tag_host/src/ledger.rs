//! Tag ledger: `tagged/tags.json`

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LEDGER_FILE: &str = "tags.json";

/// One tagged image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Name inside `tagged/`
    pub file: String,
    /// Name before the move
    pub original_name: String,
    pub tags: Vec<String>,
    pub tagged_at: DateTime<Utc>,
}

/// JSON array of [`LedgerEntry`], rewritten atomically on every append
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Ledger inside the given `tagged/` directory
    pub fn in_dir(tagged_dir: &Path) -> Self {
        Self {
            path: tagged_dir.join(LEDGER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries; a missing ledger is empty
    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    pub fn append(&self, entry: LedgerEntry) -> Result<()> {
        let mut entries = self.entries()?;
        entries.push(entry);

        let content = serde_json::to_vec_pretty(&entries)?;
        app_fs::write_atomic(&self.path, &content)?;

        tracing::debug!("Ledger {:?} now has {} entries", self.path, entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str) -> LedgerEntry {
        LedgerEntry {
            file: file.to_string(),
            original_name: file.to_string(),
            tags: vec!["ecchi".to_string()],
            tagged_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::in_dir(dir.path());
        assert!(ledger.entries().unwrap().is_empty());

        ledger.append(entry("a.png")).unwrap();
        ledger.append(entry("b.png")).unwrap();

        let files: Vec<String> = ledger.entries().unwrap().into_iter().map(|e| e.file).collect();
        assert_eq!(files, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::in_dir(dir.path());
        ledger.append(entry("a.png")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(ledger.path()).unwrap()).unwrap();
        let stamp = raw[0]["tagged_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_corrupt_ledger_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LEDGER_FILE), b"{not json").unwrap();
        let ledger = Ledger::in_dir(dir.path());
        assert!(ledger.append(entry("a.png")).is_err());
    }
}
