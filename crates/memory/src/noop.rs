//! No-op memory store for agents running with memory disabled.
//!
//! Every read returns nothing and every write succeeds silently.

use async_trait::async_trait;
use spindle_core::error::MemoryError;
use spindle_core::memory::{MemoryQuery, MemoryStore, PageLink};

/// A memory store that remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMemory;

#[async_trait]
impl MemoryStore for NoopMemory {
    fn name(&self) -> &str {
        "none"
    }

    async fn get_memories(&self, _query: MemoryQuery) -> Result<Vec<String>, MemoryError> {
        Ok(vec![])
    }

    async fn write_text(&self, _user_input: &str, _text: &str) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn write_website(&self, _url: &str) -> Result<(String, Vec<PageLink>), MemoryError> {
        Ok((String::new(), vec![]))
    }
}
