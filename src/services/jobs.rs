// src/services/jobs.rs

//! Government-jobs source adapter.
//!
//! Fetches the full circular listing and normalizes each record into an
//! [`Item`]. The upstream lists newest-first; emission order is reversed so
//! downstream delivery stays chronological.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{Item, JobsConfig, PLACEHOLDER, Source};
use crate::services::ContentSource;

/// Input pattern of the upstream's end-date field.
const END_DATE_INPUT: &str = "%Y-%m-%d";

/// Display pattern for the deadline line, e.g. "07 August, 2026".
const END_DATE_OUTPUT: &str = "%d %B, %Y";

/// Listing envelope returned by the jobs endpoint.
#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    status: Option<String>,
    #[serde(default)]
    data: Vec<JobRecord>,
}

/// One raw job record.
#[derive(Debug, Default, Deserialize)]
struct JobRecord {
    id: Option<i64>,
    job_title: Option<String>,
    organization: Option<String>,
    organization_slug: Option<String>,
    application_end_date: Option<String>,
    circular_link: Option<String>,
}

/// Adapter for the government-jobs listing API.
pub struct JobsSource {
    config: JobsConfig,
    client: Client,
}

impl JobsSource {
    /// Create a new jobs adapter with the given configuration and client.
    pub fn new(config: JobsConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ContentSource for JobsSource {
    fn name(&self) -> &'static str {
        "govt-jobs"
    }

    fn pacing(&self) -> std::time::Duration {
        self.config.pacing()
    }

    async fn fetch_and_normalize(&self) -> Result<Vec<Item>> {
        let envelope: JobsEnvelope = self
            .client
            .get(&self.config.list_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(normalize(envelope, &self.config))
    }
}

/// Normalize a decoded listing into Items, oldest-first.
fn normalize(envelope: JobsEnvelope, config: &JobsConfig) -> Vec<Item> {
    if envelope.status.as_deref() != Some("success") {
        log::warn!(
            "Jobs listing reported status {:?}, treating as no items",
            envelope.status
        );
        return Vec::new();
    }

    // Assumption carried from the upstream: the listing is newest-first.
    envelope
        .data
        .into_iter()
        .rev()
        .filter_map(|record| normalize_record(record, config))
        .collect()
}

/// Normalize one record, or skip it when it carries no native id.
fn normalize_record(record: JobRecord, config: &JobsConfig) -> Option<Item> {
    let Some(native_id) = record.id else {
        log::debug!("Skipping job record without an id");
        return None;
    };

    let end_date = record
        .application_end_date
        .as_deref()
        .map(format_end_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Some(Item {
        unique_id: Source::Jobs.unique_id(native_id),
        source: Source::Jobs,
        title: record.job_title.unwrap_or_else(|| PLACEHOLDER.to_string()),
        subtitle: record
            .organization
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        primary_url: circular_url(&config.site_base_url, record.circular_link.as_deref()),
        apply_url: Some(apply_url(
            &config.site_base_url,
            record.organization_slug.as_deref().unwrap_or(""),
            native_id,
        )),
        photo_url: None,
        end_date: Some(end_date),
    })
}

/// Format the end date for display, substituting a placeholder on any
/// parse failure.
fn format_end_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, END_DATE_INPUT)
        .map(|date| date.format(END_DATE_OUTPUT).to_string())
        .unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// Join the circular-document path onto the site base, or fall back to the
/// base alone when the path is absent.
fn circular_url(base: &str, path: Option<&str>) -> String {
    match path {
        Some(p) if !p.trim().is_empty() => Url::parse(base)
            .and_then(|b| b.join(p))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| base.to_string()),
        _ => base.to_string(),
    }
}

/// Applicant-facing link, keyed by organization slug and native id.
fn apply_url(base: &str, slug: &str, native_id: i64) -> String {
    format!(
        "{}/jobs/government/{}/apply/{}",
        base.trim_end_matches('/'),
        slug,
        native_id
    )
}
