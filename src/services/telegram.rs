// src/services/telegram.rs

//! Messaging platform client (Telegram Bot API contract).
//!
//! Only the two operations the pipeline consumes are implemented: a
//! rich-formatted text message with inline link buttons, and a photo with a
//! rich-formatted caption and the same button layout, both addressed to one
//! fixed channel.

use reqwest::Client;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Announcement posted to the channel after a successful startup.
const ONLINE_ANNOUNCEMENT: &str = "✅ সমন্বিত নিউজ ও জব বুলেটিন বট সফলভাবে অনলাইন।";

/// One inline link button.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub url: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Inline keyboard attached below a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Stack the given buttons one per row.
    pub fn single_column(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

/// Client bound to one bot credential and one channel.
#[derive(Clone)]
pub struct ChannelClient {
    client: Client,
    api_base: String,
    channel_id: String,
}

impl ChannelClient {
    /// Create a client for the given bot token and channel id.
    pub fn new(client: Client, bot_token: &str, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            api_base: format!("https://api.telegram.org/bot{bot_token}"),
            channel_id: channel_id.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Verify the credential and the platform's reachability.
    ///
    /// Called once at startup; a failure here is the one unrecoverable
    /// condition the process aborts on.
    pub async fn check_connectivity(&self) -> Result<()> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        Self::check_response("getMe", response).await
    }

    /// Post the startup announcement to the channel.
    pub async fn announce_online(&self) -> Result<()> {
        self.send_text(ONLINE_ANNOUNCEMENT, None, true).await
    }

    /// Send an HTML-formatted text message with optional inline buttons.
    pub async fn send_text(
        &self,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
        disable_preview: bool,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &self.channel_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: disable_preview,
            reply_markup: keyboard,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;
        Self::check_response("sendMessage", response).await
    }

    /// Send photo bytes with an HTML-formatted caption and inline buttons.
    pub async fn send_photo(
        &self,
        photo: Vec<u8>,
        caption: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut form = multipart::Form::new()
            .text("chat_id", self.channel_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", multipart::Part::bytes(photo).file_name("photo.jpg"));

        if let Some(keyboard) = keyboard {
            form = form.text("reply_markup", serde_json::to_string(keyboard)?);
        }

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::check_response("sendPhoto", response).await
    }

    /// Map the Bot API envelope to a result.
    ///
    /// The platform reports failures as `ok = false` with a description,
    /// usually alongside a non-2xx status, so the body is decoded before the
    /// status is considered.
    async fn check_response(context: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        match response.json::<ApiResponse>().await {
            Ok(body) if body.ok => Ok(()),
            Ok(body) => Err(AppError::telegram(
                context,
                body.description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            )),
            Err(e) => Err(AppError::telegram(context, format!("HTTP {status}: {e}"))),
        }
    }
}
