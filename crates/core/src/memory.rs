//! Memory collaborator trait — retrieval, text writes, and website
//! ingestion.
//!
//! The vector index and embedding algorithm live behind this trait;
//! the interaction loop only needs ranked passages back. Memories are
//! grouped into named collections; a query against `None` targets the
//! default collection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// The default collection queried when none is named.
pub const DEFAULT_COLLECTION: &str = "default";

/// A query for retrieving memory passages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// The retrieval text (usually the user's input)
    pub text: String,

    /// Maximum number of passages
    pub limit: usize,

    /// Minimum relevance score threshold
    #[serde(default)]
    pub min_relevance: f32,

    /// Collection to query; `None` means the default collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl MemoryQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            min_relevance: 0.0,
            collection: None,
        }
    }

    pub fn with_min_relevance(mut self, min_relevance: f32) -> Self {
        self.min_relevance = min_relevance;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

/// A link discovered while ingesting a website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// The link text
    pub label: String,
    /// The link target
    pub url: String,
}

/// The memory-store collaborator.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Retrieve up to `limit` passages relevant to the query text,
    /// ranked by relevance, filtered by the minimum score.
    async fn get_memories(
        &self,
        query: MemoryQuery,
    ) -> std::result::Result<Vec<String>, MemoryError>;

    /// Persist a response text associated with the input that
    /// produced it.
    async fn write_text(
        &self,
        user_input: &str,
        text: &str,
    ) -> std::result::Result<(), MemoryError>;

    /// Ingest a website into memory, returning the extracted text and
    /// the links discovered on the page.
    async fn write_website(
        &self,
        url: &str,
    ) -> std::result::Result<(String, Vec<PageLink>), MemoryError>;
}
