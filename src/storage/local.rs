// src/storage/local.rs

//! Local filesystem dedup store.
//!
//! The full record set lives in one JSON document, loaded into memory at
//! open so `contains` never touches the disk. Every `add` rewrites the
//! document atomically (write to temp, then rename), so an interrupted
//! process leaves either the old set or the new one, never a torn file.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Source;
use crate::storage::{DedupStore, SeenFile, SeenRecord};

/// Disk-backed dedup store.
pub struct LocalDedupStore {
    path: PathBuf,
    seen: Mutex<HashMap<String, String>>,
}

impl LocalDedupStore {
    /// Open the store at the given path, loading any existing record set.
    ///
    /// A missing file is an empty store, not an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = match Self::read_file(&path).await? {
            Some(file) => {
                log::info!("Loaded {} delivered ids from {:?}", file.count, path);
                file.records
                    .into_iter()
                    .map(|r| (r.unique_id, r.source))
                    .collect()
            }
            None => {
                log::info!("No existing store at {:?}, starting empty", path);
                HashMap::new()
            }
        };

        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    /// Number of recorded deliveries.
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    async fn read_file(path: &PathBuf) -> Result<Option<SeenFile>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the document atomically (write to temp, then rename).
    async fn write_file(&self, file: &SeenFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(file)?;
        let tmp = self.path.with_extension("tmp");
        let mut out = tokio::fs::File::create(&tmp).await?;
        out.write_all(&bytes).await?;
        out.flush().await?;
        drop(out);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DedupStore for LocalDedupStore {
    async fn contains(&self, unique_id: &str) -> Result<bool> {
        Ok(self.seen.lock().await.contains_key(unique_id))
    }

    async fn add(&self, unique_id: &str, source: Source) -> Result<()> {
        let mut seen = self.seen.lock().await;

        if seen.contains_key(unique_id) {
            log::warn!("Duplicate add ignored for {}", unique_id);
            return Ok(());
        }
        seen.insert(unique_id.to_string(), source.label().to_string());

        let mut records: Vec<SeenRecord> = seen
            .iter()
            .map(|(id, src)| SeenRecord {
                unique_id: id.clone(),
                source: src.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));

        self.write_file(&SeenFile::new(records)).await?;
        log::debug!("Recorded {} ({} total)", unique_id, seen.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_add_then_contains() {
        let tmp = TempDir::new().unwrap();
        let store = LocalDedupStore::open(tmp.path().join("seen.json"))
            .await
            .unwrap();

        assert!(!store.contains("teletalk_1").await.unwrap());
        store.add("teletalk_1", Source::Jobs).await.unwrap();
        assert!(store.contains("teletalk_1").await.unwrap());
        assert!(!store.contains("palo_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");

        {
            let store = LocalDedupStore::open(&path).await.unwrap();
            store.add("teletalk_10", Source::Jobs).await.unwrap();
            store.add("palo_7", Source::News).await.unwrap();
        }

        let reopened = LocalDedupStore::open(&path).await.unwrap();
        assert!(reopened.contains("teletalk_10").await.unwrap());
        assert!(reopened.contains("palo_7").await.unwrap());
        assert!(!reopened.contains("teletalk_11").await.unwrap());
        assert_eq!(reopened.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_noop() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");

        let store = LocalDedupStore::open(&path).await.unwrap();
        store.add("teletalk_1", Source::Jobs).await.unwrap();
        store.add("teletalk_1", Source::Jobs).await.unwrap();
        assert_eq!(store.len().await, 1);

        let reopened = LocalDedupStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalDedupStore::open(tmp.path().join("nope/seen.json"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_file_is_valid_json_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");

        let store = LocalDedupStore::open(&path).await.unwrap();
        store.add("palo_3", Source::News).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let file: SeenFile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(file.count, 1);
        assert_eq!(file.records[0].unique_id, "palo_3");
        assert_eq!(file.records[0].source, "prothomalo");
    }
}
