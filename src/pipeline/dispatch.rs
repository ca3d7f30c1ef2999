// src/pipeline/dispatch.rs

//! Notification dispatcher.
//!
//! Formats one [`Item`] per source template, shortens every outbound link,
//! and sends it to the channel. News items cascade photo → text before the
//! attempt is reported failed; jobs items have no richer variant to degrade
//! from. Failures are outcomes, not errors; the caller decides what a
//! failed delivery means.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;

use crate::error::Result;
use crate::models::{Item, PLACEHOLDER, Source};
use crate::services::{ChannelClient, InlineKeyboardButton, InlineKeyboardMarkup, LinkShortener};

// Channel-facing strings, matching the channel's audience.
const JOB_DETAILS_LABEL: &str = "📄 বিস্তারিত দেখুন";
const JOB_APPLY_LABEL: &str = "✅ আবেদন করুন";
const NEWS_READ_LABEL: &str = "📄 বিস্তারিত পড়ুন";

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The channel confirmed the send.
    Delivered,
    /// Every variant failed; the item stays unrecorded for a later retry.
    Failed,
}

/// Capability of delivering one item to the downstream channel.
///
/// This is the only component with an outward-visible side effect, so it
/// must not be invoked twice for the same item without an intervening
/// dedup check.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Deliver one item. Never raises; failure is an outcome.
    async fn deliver(&self, item: &Item) -> DeliveryOutcome;
}

/// Dispatcher posting to a Telegram channel.
pub struct TelegramDispatcher {
    channel: ChannelClient,
    shortener: LinkShortener,
    client: Client,
    news_referer: String,
}

impl TelegramDispatcher {
    /// Create a dispatcher. The `client` is used for image fetches; the
    /// `news_referer` is the header value the image host expects.
    pub fn new(
        channel: ChannelClient,
        shortener: LinkShortener,
        client: Client,
        news_referer: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            shortener,
            client,
            news_referer: news_referer.into(),
        }
    }

    async fn deliver_job(&self, item: &Item) -> DeliveryOutcome {
        let message = format_job_message(item);
        let details_url = self.shortener.shorten(&item.primary_url).await;
        let apply_url = self
            .shortener
            .shorten(item.apply_url.as_deref().unwrap_or(&item.primary_url))
            .await;
        let keyboard = InlineKeyboardMarkup::single_column(vec![
            InlineKeyboardButton::new(JOB_DETAILS_LABEL, details_url),
            InlineKeyboardButton::new(JOB_APPLY_LABEL, apply_url),
        ]);

        match self.channel.send_text(&message, Some(&keyboard), true).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => {
                log::warn!("Job send failed for {}: {}", item.unique_id, e);
                DeliveryOutcome::Failed
            }
        }
    }

    async fn deliver_news(&self, item: &Item) -> DeliveryOutcome {
        let message = format_news_message(item);
        let story_url = self.shortener.shorten(&item.primary_url).await;
        let keyboard = InlineKeyboardMarkup::single_column(vec![InlineKeyboardButton::new(
            NEWS_READ_LABEL,
            story_url,
        )]);

        // Photo variant first; each failure falls through to the text variant.
        if let Some(photo_url) = &item.photo_url {
            match self.fetch_photo(photo_url).await {
                Ok(bytes) => {
                    match self
                        .channel
                        .send_photo(bytes, &message, Some(&keyboard))
                        .await
                    {
                        Ok(()) => return DeliveryOutcome::Delivered,
                        Err(e) => log::warn!(
                            "Photo send failed for {}: {}. Falling back to text.",
                            item.unique_id,
                            e
                        ),
                    }
                }
                Err(e) => log::warn!(
                    "Photo fetch failed for {}: {}. Falling back to text.",
                    item.unique_id,
                    e
                ),
            }
        }

        // A text post degraded from a failed photo keeps the link preview on,
        // so the story card still shows an image.
        let disable_preview = item.photo_url.is_none();
        match self
            .channel
            .send_text(&message, Some(&keyboard), disable_preview)
            .await
        {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => {
                log::warn!("News send failed for {}: {}", item.unique_id, e);
                DeliveryOutcome::Failed
            }
        }
    }

    /// Fetch image bytes, supplying the referer the image host expects.
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(REFERER, self.news_referer.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Dispatch for TelegramDispatcher {
    async fn deliver(&self, item: &Item) -> DeliveryOutcome {
        match item.source {
            Source::Jobs => self.deliver_job(item).await,
            Source::News => self.deliver_news(item).await,
        }
    }
}

/// Jobs bulletin template: organization, title, application deadline.
fn format_job_message(item: &Item) -> String {
    format!(
        "<b>📢 নতুন সরকারি চাকরির বিজ্ঞপ্তি!</b>\n\n\
         <b>🏢 প্রতিষ্ঠান:</b> {}\n\
         <b>📄 শিরোনাম:</b> {}\n\
         <b>📅 আবেদনের শেষ তারিখ:</b> {}\n",
        item.subtitle,
        item.title,
        item.end_date.as_deref().unwrap_or(PLACEHOLDER)
    )
}

/// News bulletin template: bold headline, subheadline below.
fn format_news_message(item: &Item) -> String {
    format!("<b>{}</b>\n\n{}", item.title, item.subtitle)
}
