//! Queries over an in-memory collection
//!
//! The record store only hands back the whole collection; ordering, tag
//! filtering, text search and id lookup happen here.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::Link;

/// Sort links newest first (ties broken by id for a stable listing)
pub fn sort_newest_first(links: &mut [Link]) {
    links.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Tag and free-text filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    /// Only links carrying this tag (compared lowercased and trimmed)
    pub tag: Option<String>,
    /// Case-insensitive substring of title, url, note or a tag
    pub query: Option<String>,
}

impl LinkFilter {
    pub fn new(tag: Option<String>, query: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };
        Self {
            tag: clean(tag),
            query: clean(query),
        }
    }

    pub fn matches(&self, link: &Link) -> bool {
        if let Some(tag) = &self.tag {
            if !link.has_tag(tag) {
                return false;
            }
        }

        match &self.query {
            Some(query) => {
                link.title.to_lowercase().contains(query)
                    || link.url.to_lowercase().contains(query)
                    || link.note.to_lowercase().contains(query)
                    || link.tags.iter().any(|t| t.contains(query.as_str()))
            }
            None => true,
        }
    }

    /// Keep only matching links, preserving order
    pub fn apply(&self, links: Vec<Link>) -> Vec<Link> {
        links.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Tags with the number of links carrying each, most used first
pub fn tag_counts(links: &[Link]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in links.iter().flat_map(|l| l.tags.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Failure to resolve a user-supplied id
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("No link found matching: {0}")]
    NotFound(String),

    #[error("Ambiguous id '{prefix}' matches {count} links. Please provide more characters.")]
    Ambiguous { prefix: String, count: usize },
}

/// Find a link by full id or unique id prefix
pub fn resolve_id<'a>(links: &'a [Link], id: &str) -> Result<&'a Link, LookupError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(LookupError::NotFound(id.to_string()));
    }

    if let Some(exact) = links.iter().find(|l| l.id.as_str() == id) {
        return Ok(exact);
    }

    let matches: Vec<&Link> = links
        .iter()
        .filter(|l| l.id.as_str().starts_with(id))
        .collect();

    match matches.as_slice() {
        [] => Err(LookupError::NotFound(id.to_string())),
        [only] => Ok(*only),
        _ => Err(LookupError::Ambiguous {
            prefix: id.to_string(),
            count: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkId;
    use chrono::DateTime;

    fn link(id: &str, url: &str, title: &str, tags: &[&str], created_ms: i64) -> Link {
        let at = DateTime::from_timestamp_millis(created_ms).unwrap();
        Link {
            id: LinkId::from(id),
            url: url.to_string(),
            title: title.to_string(),
            note: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: at,
            updated_at: at,
        }
    }

    fn sample() -> Vec<Link> {
        vec![
            link("aaa1", "https://rust-lang.org", "Rust Programming Language", &["rust", "programming"], 1_000),
            link("aab2", "https://python.org", "Python", &["python", "programming"], 3_000),
            link("bcc3", "https://example.com", "Example Site", &[], 2_000),
        ]
    }

    #[test]
    fn test_sort_newest_first() {
        let mut links = sample();
        sort_newest_first(&mut links);
        let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["aab2", "bcc3", "aaa1"]);
    }

    #[test]
    fn test_filter_by_tag() {
        let filter = LinkFilter::new(Some(" Rust ".to_string()), None);
        let found = filter.apply(sample());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://rust-lang.org");

        let filter = LinkFilter::new(Some("programming".to_string()), None);
        assert_eq!(filter.apply(sample()).len(), 2);

        let filter = LinkFilter::new(Some("nonexistent".to_string()), None);
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_search_query() {
        let filter = LinkFilter::new(None, Some("PROGRAMMING language".to_string()));
        let found = filter.apply(sample());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Rust Programming Language");

        // Matches url and tags too
        assert_eq!(LinkFilter::new(None, Some("example.com".into())).apply(sample()).len(), 1);
        assert_eq!(LinkFilter::new(None, Some("pyth".into())).apply(sample()).len(), 1);
    }

    #[test]
    fn test_search_matches_note() {
        let mut links = sample();
        links[2].note = "Remember to read this".to_string();
        let found = LinkFilter::new(None, Some("remember".into())).apply(links);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "bcc3");
    }

    #[test]
    fn test_combined_filter_and_blank_values() {
        let filter = LinkFilter::new(Some("programming".into()), Some("python".into()));
        assert_eq!(filter.apply(sample()).len(), 1);

        let filter = LinkFilter::new(Some("  ".into()), Some("".into()));
        assert_eq!(filter, LinkFilter::default());
        assert_eq!(filter.apply(sample()).len(), 3);
    }

    #[test]
    fn test_tag_counts() {
        let counts = tag_counts(&sample());
        assert_eq!(
            counts,
            vec![
                ("programming".to_string(), 2),
                ("python".to_string(), 1),
                ("rust".to_string(), 1),
            ]
        );
        assert!(tag_counts(&[]).is_empty());
    }

    #[test]
    fn test_resolve_id() {
        let links = sample();
        assert_eq!(resolve_id(&links, "bcc3").unwrap().id.as_str(), "bcc3");
        assert_eq!(resolve_id(&links, "b").unwrap().id.as_str(), "bcc3");
        assert_eq!(resolve_id(&links, "aab").unwrap().id.as_str(), "aab2");
        assert_eq!(
            resolve_id(&links, "aa"),
            Err(LookupError::Ambiguous {
                prefix: "aa".to_string(),
                count: 2
            })
        );
        assert_eq!(
            resolve_id(&links, "zzz"),
            Err(LookupError::NotFound("zzz".to_string()))
        );
        assert!(resolve_id(&links, "").is_err());
    }

    #[test]
    fn test_resolve_exact_id_beats_prefix() {
        let links = vec![
            link("abc", "https://a.com", "A", &[], 1),
            link("abcd", "https://b.com", "B", &[], 2),
        ];
        assert_eq!(resolve_id(&links, "abc").unwrap().url, "https://a.com");
    }
}
