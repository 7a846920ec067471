//! Entry source: bulk fetch of published entries
//!
//! The picker issues exactly one [`EntryQuery`] per session. Implementations
//! talk to whatever content API the host provides; [`MemoryEntrySource`]
//! serves a fixed set of entries and expands references the same way a
//! delivery API does, which makes it suitable for embedding and tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use entry_picker_fields::{Entry, EntryCollection, Includes};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Parameters of a bulk fetch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: String,
    pub limit: u32,
    /// Number of reference hops expanded into the include set
    pub include: u32,
}

/// Something that can list published entries of a content type
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn get_published_entries(&self, query: &EntryQuery) -> Result<EntryCollection>;
}

/// In-memory entry source
#[derive(Debug, Default, Clone)]
pub struct MemoryEntrySource {
    entries: Vec<Entry>,
}

impl MemoryEntrySource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Collect linked entries breadth-first up to `depth` hops, skipping
    /// anything already among the primary items.
    fn expand(&self, items: &[Entry], depth: u32) -> Vec<Entry> {
        let by_id: HashMap<&str, &Entry> = self.entries.iter().map(|e| (e.id(), e)).collect();
        let mut seen: HashSet<&str> = items.iter().map(Entry::id).collect();
        let mut included = Vec::new();
        let mut frontier: Vec<&Entry> = items.iter().collect();

        for _ in 0..depth {
            let mut next = Vec::new();
            for entry in frontier {
                for id in entry.referenced_ids() {
                    if !seen.insert(id) {
                        continue;
                    }
                    if let Some(linked) = by_id.get(id) {
                        included.push((*linked).clone());
                        next.push(*linked);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        included
    }
}

#[async_trait]
impl EntrySource for MemoryEntrySource {
    async fn get_published_entries(&self, query: &EntryQuery) -> Result<EntryCollection> {
        let items: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| e.content_type_id() == Some(query.content_type.as_str()))
            .take(query.limit as usize)
            .cloned()
            .collect();

        let included = self.expand(&items, query.include);
        debug!(
            content_type = %query.content_type,
            items = items.len(),
            includes = included.len(),
            "served published entries"
        );

        Ok(EntryCollection {
            items,
            includes: (!included.is_empty()).then(|| Includes { entries: included }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> MemoryEntrySource {
        MemoryEntrySource::new(vec![
            Entry::new("p1")
                .with_content_type("product")
                .with_field("title", "en", "Cola")
                .with_field("category", "en", json!({ "sys": { "id": "c1" } })),
            Entry::new("p2")
                .with_content_type("product")
                .with_field("title", "en", "Chips")
                .with_field("category", "en", json!({ "sys": { "id": "c2" } })),
            Entry::new("c1")
                .with_content_type("category")
                .with_field("name", "en", "Drinks")
                .with_field("parent", "en", json!({ "sys": { "id": "root" } })),
            Entry::new("c2")
                .with_content_type("category")
                .with_field("name", "en", "Snacks"),
            Entry::new("root").with_content_type("category"),
        ])
    }

    fn query(include: u32) -> EntryQuery {
        EntryQuery {
            content_type: "product".into(),
            limit: 1000,
            include,
        }
    }

    #[tokio::test]
    async fn test_filters_by_content_type() {
        let response = catalog().get_published_entries(&query(0)).await.unwrap();
        let ids: Vec<&str> = response.items.iter().map(Entry::id).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert!(response.includes.is_none());
    }

    #[tokio::test]
    async fn test_one_hop_includes() {
        let response = catalog().get_published_entries(&query(1)).await.unwrap();
        let mut ids: Vec<&str> = response.included_entries().iter().map(Entry::id).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_two_hop_includes() {
        let response = catalog().get_published_entries(&query(2)).await.unwrap();
        let mut ids: Vec<&str> = response.included_entries().iter().map(Entry::id).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c2", "root"]);
    }

    #[tokio::test]
    async fn test_limit() {
        let mut q = query(0);
        q.limit = 1;
        let response = catalog().get_published_entries(&q).await.unwrap();
        assert_eq!(response.items.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_links_are_skipped() {
        let source = MemoryEntrySource::new(vec![Entry::new("p1")
            .with_content_type("product")
            .with_field("category", "en", json!({ "sys": { "id": "gone" } }))]);
        let response = source.get_published_entries(&query(2)).await.unwrap();
        assert!(response.included_entries().is_empty());
    }

    #[test]
    fn test_from_json() {
        let source = MemoryEntrySource::from_json(
            r#"[{ "sys": { "id": "p1", "contentType": { "sys": { "id": "product" } } }, "fields": {} }]"#,
        )
        .unwrap();
        assert_eq!(source.entries.len(), 1);
        assert_eq!(source.entries[0].content_type_id(), Some("product"));
    }

    #[tokio::test]
    async fn test_pushed_entries_are_served() {
        let mut source = MemoryEntrySource::default();
        source.push(Entry::new("late").with_content_type("product"));
        let response = source.get_published_entries(&query(0)).await.unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id(), "late");
    }

    #[test]
    fn test_from_invalid_json() {
        assert!(MemoryEntrySource::from_json("{").is_err());
    }
}
