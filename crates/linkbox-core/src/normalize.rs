//! Input normalization
//!
//! Pure functions that turn raw user input or imported JSON into canonical
//! [`Link`] records. Nothing here touches storage.

use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{Link, LinkId, LinkInput};

const DEFAULT_SCHEME: &str = "https://";

/// Trim a raw URL and default its scheme to `https://`
///
/// Strings already starting with `http://` or `https://` (any case) are
/// returned as-is apart from trimming. Empty input stays empty.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Parse a comma-separated tag list
///
/// Pieces are trimmed and lowercased; empty pieces and repeats are dropped.
/// First-occurrence order is kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

fn normalize_tags<'a>(pieces: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    pieces
        .into_iter()
        .map(|piece| piece.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Build a brand-new link from form input
pub fn build_new_link(input: &LinkInput, now: DateTime<Utc>) -> Link {
    let now = now.trunc_subsecs(3);
    derive_link(LinkId::generate(), input, now, now)
}

/// Rebuild `existing` from edited form input
///
/// Keeps the id and creation time; every mutable field is replaced.
pub fn build_updated_link(existing: &Link, input: &LinkInput, now: DateTime<Utc>) -> Link {
    derive_link(
        existing.id.clone(),
        input,
        existing.created_at,
        now.trunc_subsecs(3),
    )
}

fn derive_link(
    id: LinkId,
    input: &LinkInput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Link {
    let url = normalize_url(&input.url);
    let title = match input.title.trim() {
        "" => url.clone(),
        title => title.to_string(),
    };
    Link {
        id,
        title,
        url,
        note: input.note.trim().to_string(),
        tags: parse_tags(&input.tags),
        created_at,
        updated_at,
    }
}

/// Turn the contents of an import file into canonical links
///
/// Accepts a bare array of link-like objects or an object whose `links`
/// field holds one. Elements without a string `url` are dropped. A supplied
/// `id`, `createdAt` or `updatedAt` is kept when well-formed and replaced
/// otherwise.
pub fn normalize_imported_records(raw: &Value, now: DateTime<Utc>) -> Vec<Link> {
    let now = now.trunc_subsecs(3);
    let candidates: &[Value] = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("links") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let link = normalize_imported_record(candidate, now);
            if link.is_none() {
                warn!("Skipping import record {}: no usable url", index);
            }
            link
        })
        .collect()
}

fn normalize_imported_record(candidate: &Value, now: DateTime<Utc>) -> Option<Link> {
    let fields = candidate.as_object()?;
    let url = normalize_url(fields.get("url")?.as_str()?);
    if url.is_empty() {
        return None;
    }

    let title = match string_field(fields, "title").trim() {
        "" => url.clone(),
        title => title.to_string(),
    };

    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .and_then(LinkId::parse)
        .unwrap_or_else(LinkId::generate);

    Some(Link {
        id,
        title,
        url,
        note: string_field(fields, "note").trim().to_string(),
        tags: imported_tags(fields.get("tags")),
        created_at: timestamp_field(fields, "createdAt").unwrap_or(now),
        updated_at: timestamp_field(fields, "updatedAt").unwrap_or(now),
    })
}

fn string_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or("")
}

fn imported_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => normalize_tags(items.iter().filter_map(Value::as_str)),
        Some(Value::String(raw)) => parse_tags(raw),
        _ => Vec::new(),
    }
}

fn timestamp_field(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let value = fields.get(key)?;
    let millis = match value.as_i64() {
        Some(millis) => millis,
        None => value.as_f64().filter(|f| f.is_finite())? as i64,
    };
    DateTime::from_timestamp_millis(millis)
}
