//! Provider traits — the abstractions over model generation.
//!
//! Two paths exist into the model:
//!
//! - [`Provider::instruct`] — the primary path: a fully assembled
//!   prompt plus its token count.
//! - [`RequestDispatch::prompt_agent`] — the fallback path used by
//!   retry, JSON repair, command correction, and multi-shot sampling.
//!   It re-issues the same logical request by prompt name and
//!   arguments, bypassing local prompt assembly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ProviderError;

/// The model-generation collaborator.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider name (e.g., "openai", "mock").
    fn name(&self) -> &str;

    /// Generate a response for an assembled prompt.
    async fn instruct(
        &self,
        prompt: &str,
        token_count: usize,
    ) -> std::result::Result<String, ProviderError>;
}

/// Arguments carried on the fallback dispatch path.
///
/// These mirror the original request so a reissue stays the same
/// logical request; `context_results` shrinks across retries to
/// reduce prompt size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptArgs {
    /// The original user input
    pub user_input: String,

    /// How many memory passages to inject
    pub context_results: u32,

    /// The conversation this request belongs to
    pub conversation_name: String,

    /// Whether memory writes are disabled for this request
    #[serde(default)]
    pub disable_memory: bool,

    /// Requested sample count
    #[serde(default)]
    pub shots: u32,

    /// Caller-supplied template variables and repair context
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

/// The request-dispatch collaborator: reissues a named prompt for an
/// agent without going through local assembly.
#[async_trait]
pub trait RequestDispatch: Send + Sync {
    async fn prompt_agent(
        &self,
        agent_name: &str,
        prompt_name: &str,
        args: PromptArgs,
    ) -> std::result::Result<String, ProviderError>;
}
