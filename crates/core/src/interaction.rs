//! Interaction and conversation-history types.
//!
//! A conversation is an append-only sequence of interactions keyed by
//! agent name and conversation name. The history log is an external
//! collaborator: appends from a single interaction loop are strictly
//! ordered; interleaving across loops is permitted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HistoryError;

/// Role for the end user's own messages.
pub const USER_ROLE: &str = "USER";

/// Role for records produced by command execution or queuing.
/// The agent's own messages use the agent name as the role.
pub const EXECUTOR_ROLE: &str = "COMMAND-EXECUTOR";

/// A single interaction record in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// When this interaction happened
    pub timestamp: DateTime<Utc>,

    /// Who produced it: "USER", the agent name, or "COMMAND-EXECUTOR"
    pub role: String,

    /// The message text
    pub message: String,
}

impl Interaction {
    /// Create an interaction stamped with the current time.
    pub fn new(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role: role.into(),
            message: message.into(),
        }
    }

    /// Render this interaction as a single prompt-history line.
    pub fn render(&self) -> String {
        format!(
            "{} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.role,
            self.message
        )
    }
}

/// Generate a fresh conversation name (a v4 UUID).
pub fn fresh_conversation_name() -> String {
    Uuid::new_v4().to_string()
}

/// The conversation-history collaborator.
///
/// Implementations must support concurrent appends from independent
/// loops without reordering any single loop's own appends.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Fetch the full ordered interaction sequence for a conversation.
    /// An unknown conversation yields an empty sequence, not an error.
    async fn get_conversation(
        &self,
        agent_name: &str,
        conversation_name: &str,
    ) -> std::result::Result<Vec<Interaction>, HistoryError>;

    /// Append one interaction to a conversation, creating it if needed.
    async fn log_interaction(
        &self,
        agent_name: &str,
        conversation_name: &str,
        role: &str,
        message: &str,
    ) -> std::result::Result<(), HistoryError>;
}
