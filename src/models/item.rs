// src/models/item.rs

//! Canonical representation of one ingested unit of content.

use std::fmt;

/// Placeholder shown when an upstream field is absent or unparseable.
pub const PLACEHOLDER: &str = "N/A";

/// Upstream a piece of content was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Government job circulars (Teletalk alljobs API)
    Jobs,

    /// News stories (Prothom Alo collection API)
    News,
}

impl Source {
    /// Prefix used when forming `unique_id`s.
    ///
    /// The prefix keeps ids from the two upstreams disjoint, so one store
    /// can hold both without collisions.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Source::Jobs => "teletalk",
            Source::News => "palo",
        }
    }

    /// Label persisted next to each delivered id.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Jobs => "teletalk",
            Source::News => "prothomalo",
        }
    }

    /// Form the globally unique id for an upstream-native id.
    pub fn unique_id(&self, native_id: i64) -> String {
        format!("{}_{}", self.id_prefix(), native_id)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized unit of content, ready for dedup-check and delivery.
///
/// Items are transient: built fresh on every polling pass and dropped once
/// dispatch resolves. Only the `unique_id` outlives the pass, inside the
/// dedup store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Globally unique id, `<source-prefix>_<native-id>`. Stable across polls.
    pub unique_id: String,

    /// Which upstream produced this item
    pub source: Source,

    /// Headline (news) or circular title (jobs)
    pub title: String,

    /// Subheadline (news) or organization name (jobs)
    pub subtitle: String,

    /// Main destination link, pre-shortening
    pub primary_url: String,

    /// Applicant-facing link (jobs only)
    pub apply_url: Option<String>,

    /// Resolved image URL (news only)
    pub photo_url: Option<String>,

    /// Application deadline as a display string (jobs only)
    pub end_date: Option<String>,
}
