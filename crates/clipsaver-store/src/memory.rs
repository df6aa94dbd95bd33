//! In-process store, for tests and dry runs.

use std::sync::Mutex;

use crate::{LedgerRecord, LedgerStore, StoreError, StoreResult};

/// Ledger kept in memory. Counts saves so callers can assert on persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    record: Option<LedgerRecord>,
    saves: usize,
    fail_loads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `record`.
    pub fn with_record(record: LedgerRecord) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.inner.lock() {
            state.record = Some(record);
        }
        store
    }

    /// A store whose loads always fail, as an unreadable file would.
    pub fn failing() -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.inner.lock() {
            state.fail_loads = true;
        }
        store
    }

    /// Number of successful `save` calls.
    pub fn saves(&self) -> usize {
        self.inner.lock().map(|s| s.saves).unwrap_or(0)
    }

    /// Current stored record, if any.
    pub fn snapshot(&self) -> Option<LedgerRecord> {
        self.inner.lock().ok().and_then(|s| s.record)
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<LedgerRecord>> {
        let state = self
            .inner
            .lock()
            .map_err(|_| StoreError::OperationFailed("memory store poisoned".to_string()))?;
        if state.fail_loads {
            return Err(StoreError::OperationFailed("simulated read failure".to_string()));
        }
        Ok(state.record)
    }

    fn save(&self, record: &LedgerRecord) -> StoreResult<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| StoreError::OperationFailed("memory store poisoned".to_string()))?;
        state.record = Some(*record);
        state.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
