// src/services/news.rs

//! News source adapter.
//!
//! Fetches one bounded page of wrapped stories and normalizes them into
//! [`Item`]s. Wrappers missing a usable identifier or headline are treated
//! as malformed and dropped silently, not as errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Item, NewsConfig, Source};
use crate::services::{ContentSource, resolve_photo_url};

/// Collection envelope returned by the news endpoint.
#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    #[serde(default)]
    items: Vec<StoryWrapper>,
}

/// One wrapped story entry.
#[derive(Debug, Default, Deserialize)]
struct StoryWrapper {
    id: Option<i64>,
    story: Option<Story>,
}

/// Raw story payload, as served by the collection endpoint.
///
/// Every field is optional: upstream metadata is not trusted to be complete,
/// and a missing shape must never abort the item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Story {
    pub headline: Option<String>,
    pub slug: Option<String>,
    pub subheadline: Option<String>,
    #[serde(default)]
    pub metadata: StoryMetadata,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Story metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryMetadata {
    #[serde(rename = "social-share", default)]
    pub social_share: Option<SocialShare>,
}

/// Social-share metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialShare {
    pub image: Option<ImageRef>,
}

/// Reference to an image on the image host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRef {
    pub key: Option<String>,
}

/// One content card of a story.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Card {
    #[serde(rename = "story-elements", default)]
    pub story_elements: Vec<StoryElement>,
}

/// One element within a card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryElement {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "image-s3-key")]
    pub image_key: Option<String>,
}

/// Adapter for the news collection API.
pub struct NewsSource {
    config: NewsConfig,
    client: Client,
}

impl NewsSource {
    /// Create a new news adapter with the given configuration and client.
    pub fn new(config: NewsConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ContentSource for NewsSource {
    fn name(&self) -> &'static str {
        "news"
    }

    fn pacing(&self) -> std::time::Duration {
        self.config.pacing()
    }

    async fn fetch_and_normalize(&self) -> Result<Vec<Item>> {
        let envelope: NewsEnvelope = self
            .client
            .get(&self.config.collection_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(normalize(envelope, &self.config))
    }
}

/// Normalize a decoded collection page into Items, oldest-first.
fn normalize(envelope: NewsEnvelope, config: &NewsConfig) -> Vec<Item> {
    // Assumption carried from the upstream: the collection is newest-first.
    envelope
        .items
        .into_iter()
        .rev()
        .filter_map(|wrapper| normalize_wrapper(wrapper, config))
        .collect()
}

/// Normalize one wrapper, or skip it when the id or headline is unusable.
fn normalize_wrapper(wrapper: StoryWrapper, config: &NewsConfig) -> Option<Item> {
    let Some(native_id) = wrapper.id else {
        log::debug!("Skipping story wrapper without an id");
        return None;
    };
    let story = wrapper.story.unwrap_or_default();

    let Some(headline) = story.headline.as_deref().filter(|h| !h.trim().is_empty()) else {
        log::debug!("Skipping story {} without a headline", native_id);
        return None;
    };

    let photo_url = resolve_photo_url(&story, &config.image_base_url);

    Some(Item {
        unique_id: Source::News.unique_id(native_id),
        source: Source::News,
        title: headline.to_string(),
        subtitle: story.subheadline.clone().unwrap_or_default(),
        primary_url: story_url(&config.site_base_url, story.slug.as_deref()),
        apply_url: None,
        photo_url,
        end_date: None,
    })
}

/// Story link from the site base and slug, or the base alone when the slug
/// is absent.
fn story_url(base: &str, slug: Option<&str>) -> String {
    match slug {
        Some(s) if !s.trim().is_empty() => {
            format!("{}/{}", base.trim_end_matches('/'), s.trim_start_matches('/'))
        }
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(id: i64, headline: &str) -> StoryWrapper {
        StoryWrapper {
            id: Some(id),
            story: Some(Story {
                headline: Some(headline.to_string()),
                slug: Some(format!("bangladesh/story-{id}")),
                subheadline: Some(format!("Sub {id}")),
                ..Story::default()
            }),
        }
    }

    fn config() -> NewsConfig {
        NewsConfig::default()
    }

    #[test]
    fn test_newest_first_collection_is_reversed() {
        let envelope = NewsEnvelope {
            items: vec![wrapper(12, "c"), wrapper(11, "b"), wrapper(10, "a")],
        };

        let items = normalize(envelope, &config());
        let ids: Vec<&str> = items.iter().map(|i| i.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["palo_10", "palo_11", "palo_12"]);
    }

    #[test]
    fn test_wrapper_without_headline_is_skipped() {
        let mut broken = wrapper(2, "ok");
        broken.story.as_mut().unwrap().headline = None;

        let envelope = NewsEnvelope {
            items: vec![wrapper(3, "kept"), broken],
        };

        let items = normalize(envelope, &config());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unique_id, "palo_3");
    }

    #[test]
    fn test_wrapper_without_id_is_skipped() {
        let envelope = NewsEnvelope {
            items: vec![
                StoryWrapper {
                    id: None,
                    ..StoryWrapper::default()
                },
                wrapper(4, "kept"),
            ],
        };

        let items = normalize(envelope, &config());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_blank_headline_is_skipped() {
        let mut blank = wrapper(5, "   ");
        blank.story.as_mut().unwrap().subheadline = None;

        let envelope = NewsEnvelope { items: vec![blank] };
        assert!(normalize(envelope, &config()).is_empty());
    }

    #[test]
    fn test_story_url_from_slug_or_base() {
        let base = "https://www.prothomalo.com";
        assert_eq!(
            story_url(base, Some("bangladesh/story-1")),
            "https://www.prothomalo.com/bangladesh/story-1"
        );
        assert_eq!(story_url(base, None), base);
        assert_eq!(story_url(base, Some("")), base);
    }

    #[test]
    fn test_missing_subheadline_defaults_empty() {
        let mut w = wrapper(6, "headline");
        w.story.as_mut().unwrap().subheadline = None;
        let item = normalize_wrapper(w, &config()).unwrap();
        assert_eq!(item.subtitle, "");
    }

    #[test]
    fn test_decodes_wire_shape() {
        let json = serde_json::json!({
            "items": [
                {
                    "id": 99,
                    "story": {
                        "headline": "শিরোনাম",
                        "slug": "bangladesh/x",
                        "subheadline": "উপশিরোনাম",
                        "metadata": {
                            "social-share": { "image": { "key": "img/99.jpg" } }
                        },
                        "cards": []
                    }
                }
            ]
        });

        let envelope: NewsEnvelope = serde_json::from_value(json).unwrap();
        let items = normalize(envelope, &config());
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].photo_url.as_deref(),
            Some("https://images.prothomalo.com/img/99.jpg")
        );
    }
}
