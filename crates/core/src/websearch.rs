//! Web-search collaborator trait.
//!
//! The search subsystem crawls the web and writes findings into
//! memory on its own; the interaction loop only hands it a query,
//! a crawl depth, and a timeout.

use async_trait::async_trait;

use crate::error::WebsearchError;

/// The web-search collaborator.
#[async_trait]
pub trait Websearch: Send + Sync {
    /// Run a search for the query, crawling up to `depth` result
    /// links. A `timeout_secs` of 0 means no timeout.
    async fn search(
        &self,
        query: &str,
        depth: u32,
        timeout_secs: u64,
    ) -> std::result::Result<(), WebsearchError>;
}
