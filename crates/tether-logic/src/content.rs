//! Content items and intake.
//!
//! The content provider hands over an ordered list of records. The core
//! never mutates them; it only needs a usable id to seed placement and to
//! report clicks. Records without an id (or repeating one) are dropped with
//! a warning and the rest keep their order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DataError;

/// A record as it arrives from the provider. `id` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContentItem {
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub category: String,
}

/// A record that passed intake. Read-only from the core's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub category: String,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: String::new(),
            excerpt: String::new(),
            category: String::new(),
        }
    }
}

impl From<ContentItem> for RawContentItem {
    fn from(item: ContentItem) -> Self {
        Self {
            id: Some(item.id),
            title: item.title,
            date: item.date,
            excerpt: item.excerpt,
            category: item.category,
        }
    }
}

/// Outcome of intake.
#[derive(Debug, Clone, Default)]
pub struct ContentIntake {
    pub accepted: Vec<ContentItem>,
    pub rejected: Vec<DataError>,
}

/// Drop records with a missing/blank or duplicate id.
pub fn sanitize_items(items: Vec<RawContentItem>) -> ContentIntake {
    let mut intake = ContentIntake::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in items.into_iter().enumerate() {
        let id = match raw.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                log::warn!("Skipping content item {index}: missing id");
                intake.rejected.push(DataError::MissingId { index });
                continue;
            }
        };
        if !seen.insert(id.clone()) {
            log::warn!("Skipping content item {index}: duplicate id {id:?}");
            intake.rejected.push(DataError::DuplicateId { index, id });
            continue;
        }
        intake.accepted.push(ContentItem {
            id,
            title: raw.title,
            date: raw.date,
            excerpt: raw.excerpt,
            category: raw.category,
        });
    }

    intake
}

/// Parse a JSON array of records and run intake.
pub fn parse_items(json: &str) -> Result<ContentIntake, serde_json::Error> {
    let raw: Vec<RawContentItem> = serde_json::from_str(json)?;
    Ok(sanitize_items(raw))
}
