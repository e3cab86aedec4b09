//! Error types for the Spindle domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own bounded error enum.
//!
//! Note that the interaction loop itself never surfaces these to its
//! caller: every recoverable failure becomes either a fallback branch
//! or a diagnostic string in the returned response. The enums below
//! exist at the collaborator boundaries, where the loop decides which
//! recovery path to take.

use thiserror::Error;

/// The top-level error type for all Spindle operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Template errors ---
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Capability errors ---
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    // --- Conversation history errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Review queue errors ---
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    // --- Web search errors ---
    #[error("Websearch error: {0}")]
    Websearch(#[from] WebsearchError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    #[error("Template not found: '{name}' in category '{category}'")]
    NotFound { name: String, category: String },

    #[error("Template store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Website ingestion failed for {url}: {reason}")]
    IngestFailed { url: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    #[error("Capability not found: {0}")]
    NotFound(String),

    #[error("Duplicate capability name: {0}")]
    DuplicateName(String),

    #[error("Capability execution failed: {name} — {reason}")]
    ExecutionFailed { name: String, reason: String },

    #[error("Invalid capability arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("History storage error: {0}")]
    Storage(String),

    #[error("Conversation not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("Queue storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum WebsearchError {
    #[error("Web search timed out after {0}s")]
    Timeout(u64),

    #[error("Web search failed: {0}")]
    Failed(String),
}
