// src/storage/mod.rs

//! Durable record of which items have already been delivered.
//!
//! The store is a set-membership check keyed on `unique_id`. A record is
//! written exactly once, immediately after a confirmed delivery, and never
//! updated or deleted. The set grows monotonically for the life of the
//! deployment.
//!
//! ## File Layout
//!
//! ```text
//! data/
//! └── seen.json             # All delivered ids, rewritten atomically
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Source;

// Re-export for convenience
pub use local::LocalDedupStore;

/// One persisted delivery record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    /// Dedup key, `<source-prefix>_<native-id>`
    pub unique_id: String,
    /// Source label the item came from
    pub source: String,
}

/// On-disk document wrapping the full record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenFile {
    /// ISO 8601 timestamp of the last write
    pub updated_at: DateTime<Utc>,
    /// Total record count
    pub count: usize,
    /// The records array
    pub records: Vec<SeenRecord>,
}

impl SeenFile {
    pub fn new(records: Vec<SeenRecord>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: records.len(),
            records,
        }
    }
}

/// Trait for dedup store backends.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Whether `unique_id` was recorded by any earlier successful `add`,
    /// including adds from previous process lifetimes.
    async fn contains(&self, unique_id: &str) -> Result<bool>;

    /// Record a confirmed delivery.
    ///
    /// Inserting an id that is already present is a logged no-op, never a
    /// corrupting write.
    async fn add(&self, unique_id: &str, source: Source) -> Result<()>;
}
