//! Storage abstractions for listing history.
//!
//! The whole history is read once at run start and rewritten once at run
//! end. Nothing is written mid-run.
//!
//! ## File Format
//!
//! ```text
//! [
//!     [
//!         "Free couch",
//!         "9f2c...e1",                       # fingerprint, hex
//!         "https://sfbay.craigslist.org/sfc/zip/1.html",
//!         "2026-10-14"                       # first seen
//!     ]
//! ]
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::History;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Trait for history storage backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Human-readable location, used in log lines and errors.
    fn location(&self) -> String;

    /// Read the stored history, failing with `AppError::StoreLoad`.
    async fn read(&self) -> Result<History>;

    /// Replace the stored history, failing with `AppError::StoreSave`.
    async fn save(&self, history: &History) -> Result<()>;

    /// Read the stored history, falling back to an empty one.
    async fn load(&self) -> History {
        match self.read().await {
            Ok(history) => history,
            Err(e) => {
                log::warn!(
                    "Failed to load listings from {}, assuming an empty database: {}",
                    self.location(),
                    e
                );
                History::new()
            }
        }
    }
}
