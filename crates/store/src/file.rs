//! JSON-file backed item table.
//!
//! The whole table lives in memory and is rewritten to `path` after every
//! write (temp file + rename).  A write only reports success once the file
//! is on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tk_domain::error::{Error, Result};
use tokio::sync::Mutex;

use crate::backend::{Item, ItemBackend, ItemQuery};
use crate::memory::MemoryBackend;

pub struct FileBackend {
    table: MemoryBackend,
    path: PathBuf,
    /// Serializes snapshot + write so an older snapshot never lands last.
    persist_lock: Mutex<()>,
}

impl FileBackend {
    /// Load the table at `path`, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::Io)?;
            }
        }

        let items: Vec<Item> = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    Error::Store(format!("parsing {}: {e}", path.display()))
                })?
            }
        } else {
            Vec::new()
        };

        tracing::info!(
            items = items.len(),
            path = %path.display(),
            "tracking table loaded"
        );

        Ok(Self {
            table: MemoryBackend::from_items(items),
            path: path.to_path_buf(),
            persist_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current table to disk.
    pub async fn flush(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let json = serde_json::to_string_pretty(&self.table.snapshot())
            .map_err(|e| Error::Store(format!("serializing tracking table: {e}")))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| Error::Store(format!("persist task failed: {e}")))?
    }
}

fn write_atomic(path: &Path, json: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(Error::Io)?;
    std::fs::rename(&tmp, path).map_err(Error::Io)
}

#[async_trait]
impl ItemBackend for FileBackend {
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        self.table.get_item(partition_key, sort_key).await
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        let previous = self.table.replace(item.clone());

        if let Err(e) = self.flush().await {
            // Roll back so memory never claims a write the file lacks, unless
            // a later write already replaced ours.
            if !self.table.restore_if_current(&item, previous) {
                tracing::warn!(
                    partition_key = %item.partition_key,
                    sort_key = %item.sort_key,
                    "persist failed after a newer write; rollback skipped"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn query(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        Ok(self.table.select(query))
    }

    async fn delete_item(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        if self.table.remove(partition_key, sort_key).is_some() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        FileBackend::flush(self).await
    }
}
