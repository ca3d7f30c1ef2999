// src/pipeline/scheduler.rs

//! The polling loop.
//!
//! Two states: Polling (one pass over all sources) and Idle (sleeping the
//! configured interval). A pass-level failure is logged and followed by a
//! longer recovery pause; the loop itself never exits on a transient error.

use crate::error::Result;
use crate::models::SchedulerConfig;
use crate::pipeline::dispatch::Dispatch;
use crate::pipeline::poll::run_pass;
use crate::services::{ChannelClient, ContentSource};
use crate::storage::DedupStore;

/// Run the notifier until the process is terminated.
///
/// Startup performs a connectivity check against the messaging platform and
/// posts the online announcement; failure of either is fatal, the one
/// unrecoverable condition in the design.
pub async fn run_scheduler(
    config: &SchedulerConfig,
    sources: &[Box<dyn ContentSource>],
    store: &dyn DedupStore,
    dispatcher: &dyn Dispatch,
    channel: &ChannelClient,
) -> Result<()> {
    channel.check_connectivity().await?;
    channel.announce_online().await?;
    log::info!("Connected to the messaging platform, channel announced online");

    loop {
        match run_pass(sources, store, dispatcher).await {
            Ok(outcome) => {
                log::info!(
                    "Pass complete: {} fetched, {} delivered, {} failed, {} already seen",
                    outcome.fetched,
                    outcome.delivered,
                    outcome.failed,
                    outcome.skipped_seen
                );
                log::info!(
                    "Sleeping {}s until the next pass",
                    config.poll_interval_secs
                );
                tokio::time::sleep(config.poll_interval()).await;
            }
            Err(e) => {
                log::error!(
                    "Polling pass failed: {}. Pausing {}s before resuming.",
                    e,
                    config.recovery_pause_secs
                );
                tokio::time::sleep(config.recovery_pause()).await;
            }
        }
    }
}
