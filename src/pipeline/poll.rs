// src/pipeline/poll.rs

//! One polling pass over all content sources.
//!
//! Sources run strictly in order, one item at a time. Per item:
//! dedup-check → deliver → record → pacing delay. The dedup record is
//! written only after a confirmed delivery, so a failed or interrupted
//! attempt is retried on the next pass via re-poll.

use crate::error::Result;
use crate::pipeline::dispatch::{DeliveryOutcome, Dispatch};
use crate::services::ContentSource;
use crate::storage::DedupStore;

/// Summary of one polling pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    /// Items the sources produced this pass
    pub fetched: usize,
    /// Items already recorded as delivered
    pub skipped_seen: usize,
    /// Items delivered and recorded this pass
    pub delivered: usize,
    /// Items whose delivery failed (left unrecorded for retry)
    pub failed: usize,
}

/// Run one pass: every source, oldest item first, jobs before news.
///
/// A source fetch failure is logged and contributes zero items; a store
/// failure propagates, since nothing can be safely delivered without a
/// working dedup check.
pub async fn run_pass(
    sources: &[Box<dyn ContentSource>],
    store: &dyn DedupStore,
    dispatcher: &dyn Dispatch,
) -> Result<PassOutcome> {
    let mut outcome = PassOutcome::default();

    for source in sources {
        log::info!("Checking {} for new items", source.name());

        let items = match source.fetch_and_normalize().await {
            Ok(items) => items,
            Err(e) => {
                log::warn!(
                    "Fetch failed for {}: {}. No items this cycle.",
                    source.name(),
                    e
                );
                continue;
            }
        };
        outcome.fetched += items.len();

        for item in &items {
            if store.contains(&item.unique_id).await? {
                outcome.skipped_seen += 1;
                continue;
            }

            log::info!(
                "New item from {}: {} ({})",
                source.name(),
                item.title,
                item.unique_id
            );

            match dispatcher.deliver(item).await {
                DeliveryOutcome::Delivered => {
                    store.add(&item.unique_id, item.source).await?;
                    outcome.delivered += 1;
                    tokio::time::sleep(source.pacing()).await;
                }
                DeliveryOutcome::Failed => {
                    // Left unrecorded; the upstream still lists it, so the
                    // next pass will find it absent and try again.
                    log::warn!("Delivery failed for {}, will retry next pass", item.unique_id);
                    outcome.failed += 1;
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::models::{Item, Source};
    use crate::storage::LocalDedupStore;

    struct StubSource {
        items: Vec<Item>,
        fail: bool,
    }

    #[async_trait]
    impl ContentSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn pacing(&self) -> Duration {
            Duration::ZERO
        }

        async fn fetch_and_normalize(&self) -> Result<Vec<Item>> {
            if self.fail {
                return Err(crate::error::AppError::validation("stub fetch failure"));
            }
            Ok(self.items.clone())
        }
    }

    #[derive(Default)]
    struct StubDispatch {
        /// ids whose delivery should fail
        failing: HashSet<String>,
        /// every delivery attempt, in order
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Dispatch for StubDispatch {
        async fn deliver(&self, item: &Item) -> DeliveryOutcome {
            self.attempts.lock().unwrap().push(item.unique_id.clone());
            if self.failing.contains(&item.unique_id) {
                DeliveryOutcome::Failed
            } else {
                DeliveryOutcome::Delivered
            }
        }
    }

    fn item(source: Source, native_id: i64) -> Item {
        Item {
            unique_id: source.unique_id(native_id),
            source,
            title: format!("Item {native_id}"),
            subtitle: String::new(),
            primary_url: "https://example.com".to_string(),
            apply_url: None,
            photo_url: None,
            end_date: None,
        }
    }

    fn sources_of(items: Vec<Item>) -> Vec<Box<dyn ContentSource>> {
        vec![Box::new(StubSource { items, fail: false })]
    }

    async fn store_in(tmp: &TempDir) -> LocalDedupStore {
        LocalDedupStore::open(tmp.path().join("seen.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delivers_in_source_order_and_records() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp).await;
        let dispatch = StubDispatch::default();
        let sources = sources_of(vec![
            item(Source::Jobs, 10),
            item(Source::Jobs, 11),
            item(Source::Jobs, 12),
        ]);

        let outcome = run_pass(&sources, &store, &dispatch).await.unwrap();

        assert_eq!(outcome.delivered, 3);
        assert_eq!(
            *dispatch.attempts.lock().unwrap(),
            vec!["teletalk_10", "teletalk_11", "teletalk_12"]
        );
        assert!(store.contains("teletalk_12").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_pass_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp).await;
        let dispatch = StubDispatch::default();
        let sources = sources_of(vec![item(Source::News, 1)]);

        run_pass(&sources, &store, &dispatch).await.unwrap();
        let second = run_pass(&sources, &store, &dispatch).await.unwrap();

        assert_eq!(second.delivered, 0);
        assert_eq!(second.skipped_seen, 1);
        assert_eq!(dispatch.attempts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried_next_pass() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp).await;
        let sources = sources_of(vec![item(Source::Jobs, 7)]);

        let failing = StubDispatch {
            failing: HashSet::from(["teletalk_7".to_string()]),
            ..StubDispatch::default()
        };
        let first = run_pass(&sources, &store, &failing).await.unwrap();
        assert_eq!(first.failed, 1);
        assert!(!store.contains("teletalk_7").await.unwrap());

        let working = StubDispatch::default();
        let second = run_pass(&sources, &store, &working).await.unwrap();
        assert_eq!(second.delivered, 1);
        assert!(store.contains("teletalk_7").await.unwrap());
    }

    #[tokio::test]
    async fn test_prepopulated_store_skips_seen_ids() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp).await;
        store.add("teletalk_10", Source::Jobs).await.unwrap();

        let dispatch = StubDispatch::default();
        let sources = sources_of(vec![item(Source::Jobs, 10), item(Source::Jobs, 11)]);

        let outcome = run_pass(&sources, &store, &dispatch).await.unwrap();

        assert_eq!(outcome.skipped_seen, 1);
        assert_eq!(outcome.delivered, 1);
        assert_eq!(*dispatch.attempts.lock().unwrap(), vec!["teletalk_11"]);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_block_the_next() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp).await;
        let dispatch = StubDispatch::default();

        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(StubSource {
                items: Vec::new(),
                fail: true,
            }),
            Box::new(StubSource {
                items: vec![item(Source::News, 3)],
                fail: false,
            }),
        ];

        let outcome = run_pass(&sources, &store, &dispatch).await.unwrap();
        assert_eq!(outcome.delivered, 1);
        assert!(store.contains("palo_3").await.unwrap());
    }
}
