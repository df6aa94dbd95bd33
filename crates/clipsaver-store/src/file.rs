//! JSON file store.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{LedgerRecord, LedgerStore, StoreError, StoreResult};

/// Ledger stored as pretty-printed JSON at a fixed path.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> StoreResult<Option<LedgerRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No ledger file yet");
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let record: LedgerRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    fn save(&self, record: &LedgerRecord) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        debug!(
            path = %self.path.display(),
            original = record.original_tokens,
            optimized = record.optimized_tokens,
            "Ledger saved"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
