//! Review-queue collaborator trait.
//!
//! When an agent is not configured for autonomous execution, resolved
//! commands are queued for manual review instead of executed. Each
//! agent gets its own named queue, auto-created on first use; steps
//! are numbered from 1 and append-only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::CommandArgs;
use crate::error::QueueError;

/// A pending command awaiting manual review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedCommand {
    /// Friendly name of the requested capability
    pub command_name: String,

    /// The arguments the model supplied
    #[serde(default)]
    pub command_args: CommandArgs,
}

/// The review-queue collaborator.
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Append a command to the named queue, creating the queue if it
    /// does not exist. Returns the 1-based step number assigned.
    async fn enqueue_step(
        &self,
        agent_name: &str,
        queue_name: &str,
        command: QueuedCommand,
    ) -> std::result::Result<u32, QueueError>;
}
