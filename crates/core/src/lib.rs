//! Core domain types and collaborator traits for Spindle.
//!
//! Spindle's interaction loop talks to everything through the traits
//! defined here: template store, memory store, conversation log,
//! capability registry, model provider, request dispatch, review
//! queue, web search, and tokenizer. The loop holds `Arc<dyn _>`
//! handles passed at construction — no process-wide singletons.

pub mod capability;
pub mod error;
pub mod interaction;
pub mod memory;
pub mod provider;
pub mod queue;
pub mod token;
pub mod websearch;

pub use capability::{Capability, CapabilityRegistry, CommandArgs};
pub use error::{
    CapabilityError, Error, HistoryError, MemoryError, ProviderError, QueueError, Result,
    TemplateError, WebsearchError,
};
pub use interaction::{
    ConversationLog, EXECUTOR_ROLE, Interaction, USER_ROLE, fresh_conversation_name,
};
pub use memory::{DEFAULT_COLLECTION, MemoryQuery, MemoryStore, PageLink};
pub use provider::{PromptArgs, Provider, RequestDispatch};
pub use queue::{QueuedCommand, ReviewQueue};
pub use token::{HeuristicTokenizer, Tokenizer, estimate_tokens};
pub use websearch::Websearch;
