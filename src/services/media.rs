// src/services/media.rs

//! Best-effort image resolution for news stories.
//!
//! Resolution order, first match wins:
//! 1. the social-share image key from the story metadata,
//! 2. the first image element found scanning the story's cards in order.
//!
//! Malformed or missing metadata yields "no image", never an error; an item
//! without a photo still gets delivered as text.

use crate::services::news::Story;

/// Resolve the image URL for a story, if any of its metadata carries one.
pub fn resolve_photo_url(story: &Story, image_base: &str) -> Option<String> {
    social_share_key(story)
        .or_else(|| first_card_image_key(story))
        .map(|key| image_url(image_base, key))
}

fn social_share_key(story: &Story) -> Option<&str> {
    story
        .metadata
        .social_share
        .as_ref()?
        .image
        .as_ref()?
        .key
        .as_deref()
        .filter(|key| !key.is_empty())
}

fn first_card_image_key(story: &Story) -> Option<&str> {
    story
        .cards
        .iter()
        .flat_map(|card| card.story_elements.iter())
        .filter(|element| element.kind.as_deref() == Some("image"))
        .find_map(|element| element.image_key.as_deref().filter(|key| !key.is_empty()))
}

fn image_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
