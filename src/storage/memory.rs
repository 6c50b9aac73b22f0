//! In-memory history store for dry runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::History;
use crate::storage::HistoryStore;

/// Keeps the history in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: Mutex<Option<History>>,
    fail_saves: bool,
    saves: Mutex<usize>,
}

impl MemoryStore {
    /// Empty store; `read` fails until something is saved.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: History) -> Self {
        Self {
            history: Mutex::new(Some(history)),
            ..Self::default()
        }
    }

    /// A store whose every save fails.
    pub fn failing_saves(history: History) -> Self {
        Self {
            fail_saves: true,
            ..Self::with_history(history)
        }
    }

    /// Snapshot of the stored history.
    pub fn snapshot(&self) -> Option<History> {
        self.history.lock().ok().and_then(|h| h.clone())
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn read(&self) -> Result<History> {
        let guard = self
            .history
            .lock()
            .map_err(|e| AppError::store_load(self.location(), e))?;
        guard
            .clone()
            .ok_or_else(|| AppError::store_load(self.location(), "nothing stored yet"))
    }

    async fn save(&self, history: &History) -> Result<()> {
        if self.fail_saves {
            return Err(AppError::store_save(self.location(), "read-only store"));
        }
        let mut guard = self
            .history
            .lock()
            .map_err(|e| AppError::store_save(self.location(), e))?;
        *guard = Some(history.clone());
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
