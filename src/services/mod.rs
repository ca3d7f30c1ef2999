// src/services/mod.rs

//! Service layer for the bulletin application.
//!
//! This module contains the upstream adapters and outbound clients:
//! - Government-jobs adapter (`JobsSource`)
//! - News adapter (`NewsSource`)
//! - Media resolution (`resolve_photo_url`)
//! - Link shortening (`LinkShortener`)
//! - Messaging platform client (`ChannelClient`)

mod jobs;
mod media;
mod news;
mod shortener;
mod telegram;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Item;

pub use jobs::JobsSource;
pub use media::resolve_photo_url;
pub use news::{Card, ImageRef, NewsSource, SocialShare, Story, StoryElement, StoryMetadata};
pub use shortener::LinkShortener;
pub use telegram::{ChannelClient, InlineKeyboardButton, InlineKeyboardMarkup};

/// Capability shared by every upstream adapter: fetch the current listing
/// and normalize it into [`Item`]s, oldest-unseen-first.
///
/// A returned sequence is finite and not restartable; calling again
/// re-fetches from the network.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Pause applied after each delivered item from this source.
    fn pacing(&self) -> Duration;

    /// Fetch the raw listing and normalize it, oldest-first.
    ///
    /// Transport and decoding failures surface as `Err`; the polling pass
    /// logs them and treats the source as having no items this cycle.
    async fn fetch_and_normalize(&self) -> Result<Vec<Item>>;
}
