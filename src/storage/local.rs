//! Local filesystem storage implementation.
//!
//! The history lives in a single JSON file. Saves write a sibling temp file
//! and rename it over the old one, so an interrupted run leaves the previous
//! history intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::History;
use crate::storage::HistoryStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize with four-space indentation.
    fn to_json(history: &History) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        history.serialize(&mut serializer)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl HistoryStore for LocalStorage {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<History> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AppError::store_load(self.location(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::store_load(self.location(), e))
    }

    async fn save(&self, history: &History) -> Result<()> {
        let bytes = Self::to_json(history).map_err(|e| AppError::store_save(self.location(), e))?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::store_save(self.location(), e))?;

        log::info!(
            "Wrote {} listings to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }
}
