//! In-memory memory store — useful for testing and ephemeral sessions.
//!
//! Relevance is a simple keyword-occurrence score, normalized by
//! passage length. Website ingestion works off pre-seeded pages so
//! tests can exercise the link-crawl path without network access.

use async_trait::async_trait;
use spindle_core::error::MemoryError;
use spindle_core::memory::{DEFAULT_COLLECTION, MemoryQuery, MemoryStore, PageLink};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A stored passage.
#[derive(Debug, Clone)]
struct Passage {
    content: String,
    /// The input that produced this passage, if any.
    source: Option<String>,
}

/// A pre-seeded website for [`InMemoryStore::write_website`].
#[derive(Debug, Clone)]
struct SeededPage {
    text: String,
    links: Vec<PageLink>,
}

/// An in-memory store holding passages in named collections.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Passage>>>,
    pages: RwLock<HashMap<String, SeededPage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            pages: RwLock::new(HashMap::new()),
        }
    }

    /// Add a passage to a collection directly (test seeding).
    pub async fn add_passage(&self, collection: &str, content: impl Into<String>) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Passage {
                content: content.into(),
                source: None,
            });
    }

    /// Seed a page so `write_website` can "fetch" it.
    pub async fn seed_website(&self, url: impl Into<String>, text: impl Into<String>, links: Vec<PageLink>) {
        self.pages.write().await.insert(
            url.into(),
            SeededPage {
                text: text.into(),
                links,
            },
        );
    }

    /// Total passages in a collection.
    pub async fn passage_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|p| p.len())
            .unwrap_or(0)
    }

    /// Keyword occurrence score, normalized per 100 chars of passage.
    fn score(content: &str, query_lower: &str) -> f32 {
        let occurrences = content.to_lowercase().matches(query_lower).count();
        occurrences as f32 / (content.len() as f32 / 100.0).max(1.0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_memories(&self, query: MemoryQuery) -> Result<Vec<String>, MemoryError> {
        let collections = self.collections.read().await;
        let collection = query.collection.as_deref().unwrap_or(DEFAULT_COLLECTION);
        let Some(passages) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let query_lower = query.text.to_lowercase();
        let mut scored: Vec<(f32, &Passage)> = passages
            .iter()
            .filter(|p| p.content.to_lowercase().contains(&query_lower))
            .map(|p| (Self::score(&p.content, &query_lower), p))
            .filter(|(score, _)| *score >= query.min_relevance)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(query.limit);

        Ok(scored.into_iter().map(|(_, p)| p.content.clone()).collect())
    }

    async fn write_text(&self, user_input: &str, text: &str) -> Result<(), MemoryError> {
        self.collections
            .write()
            .await
            .entry(DEFAULT_COLLECTION.to_string())
            .or_default()
            .push(Passage {
                content: text.to_string(),
                source: (!user_input.is_empty()).then(|| user_input.to_string()),
            });
        Ok(())
    }

    async fn write_website(&self, url: &str) -> Result<(String, Vec<PageLink>), MemoryError> {
        let page = {
            let pages = self.pages.read().await;
            pages.get(url).cloned()
        };
        let Some(page) = page else {
            return Err(MemoryError::IngestFailed {
                url: url.to_string(),
                reason: "page not reachable".into(),
            });
        };

        self.collections
            .write()
            .await
            .entry(DEFAULT_COLLECTION.to_string())
            .or_default()
            .push(Passage {
                content: page.text.clone(),
                source: Some(url.to_string()),
            });

        Ok((page.text, page.links))
    }
}
