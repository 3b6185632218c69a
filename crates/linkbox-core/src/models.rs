//! Data models for linkbox
//!
//! Defines the link record, its identifier, and the raw field values a
//! caller hands to the normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable identifier of a link record
///
/// Freshly created links get a UUID v4 in text form, but any non-empty
/// string is accepted so that ids from imported files survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Generate a fresh unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id, rejecting the empty string
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters, for compact listings
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LinkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved link with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier
    pub id: LinkId,
    /// Normalized absolute URL
    pub url: String,
    /// Display title (the URL when none was given)
    pub title: String,
    /// Free-text note, possibly empty
    #[serde(default)]
    pub note: String,
    /// Lowercase, trimmed, de-duplicated tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// When this link was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// When this link was last updated
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Whether the link carries the given (already normalized) tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Raw field values as typed by a user
///
/// `tags` is a comma-separated list; everything is normalized by
/// [`crate::normalize::build_new_link`] and friends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInput {
    pub url: String,
    pub title: String,
    pub note: String,
    pub tags: String,
}

impl LinkInput {
    /// Input with only a URL set
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Pre-fill the input from an existing link (for editing)
    pub fn from_link(link: &Link) -> Self {
        Self {
            url: link.url.clone(),
            title: link.title.clone(),
            note: link.note.clone(),
            tags: link.tags.join(", "),
        }
    }
}
