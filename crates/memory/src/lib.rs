//! In-memory collaborator backends for Spindle.
//!
//! These implement the persistence-shaped traits from `spindle-core`
//! without external storage: the memory store (keyword relevance over
//! named collections), the conversation log, and the review queue.
//! Useful for tests and ephemeral sessions; production deployments
//! plug real backends into the same traits.

pub mod history;
pub mod in_memory;
pub mod noop;
pub mod queue;

pub use history::InMemoryLog;
pub use in_memory::InMemoryStore;
pub use noop::NoopMemory;
pub use queue::InMemoryReviewQueue;
