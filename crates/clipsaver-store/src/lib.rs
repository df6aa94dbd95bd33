//! ClipSaver Storage Layer
//!
//! Persists the savings ledger as a small JSON document. The file format is
//! `{"original_tokens": int, "optimized_tokens": int}`.

pub mod file;
pub mod memory;
pub mod record;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::LedgerRecord;

use thiserror::Error;

/// Storage error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// A durable single-writer home for the ledger record.
pub trait LedgerStore: Send + Sync {
    /// Read the persisted record. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> StoreResult<Option<LedgerRecord>>;

    /// Overwrite the persisted record.
    fn save(&self, record: &LedgerRecord) -> StoreResult<()>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}
