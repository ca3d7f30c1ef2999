// src/services/shortener.rs

//! Link shortener client.
//!
//! Shortening is strictly best-effort: without a credential, and on every
//! failure of any kind, the original URL is returned unchanged. Nothing in
//! here may block a delivery.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ShortenerConfig;

#[derive(Debug, Serialize)]
struct ShortenRequest<'a> {
    long_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ShortenResponse {
    link: Option<String>,
}

/// Client for the external link-shortening service.
pub struct LinkShortener {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl LinkShortener {
    /// Create a shortener. `token = None` turns every call into a
    /// pass-through.
    pub fn new(config: &ShortenerConfig, token: Option<String>, client: Client) -> Self {
        if token.is_none() {
            log::info!("No shortener credential configured, links pass through unshortened");
        }
        Self {
            client,
            api_url: config.api_url.clone(),
            token,
        }
    }

    /// Shorten a URL, returning the original on any failure.
    pub async fn shorten(&self, long_url: &str) -> String {
        let Some(token) = &self.token else {
            return long_url.to_string();
        };

        match self.request(token, long_url).await {
            Ok(short) => short,
            Err(e) => {
                log::debug!("Shortening failed for {}: {}. Using original.", long_url, e);
                long_url.to_string()
            }
        }
    }

    async fn request(&self, token: &str, long_url: &str) -> Result<String> {
        let response: ShortenResponse = self
            .client
            .post(&self.api_url)
            .bearer_auth(token)
            .json(&ShortenRequest { long_url })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .link
            .ok_or_else(|| AppError::validation("shortener response missing the link field"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_without_credential() {
        let shortener = LinkShortener::new(&ShortenerConfig::default(), None, Client::new());
        let url = "https://example.com/a/very/long/path";
        assert_eq!(shortener.shorten(url).await, url);
    }

    #[test]
    fn test_response_missing_link_is_rejected() {
        let decoded: ShortenResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.link.is_none());
    }
}
