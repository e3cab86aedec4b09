//! In-memory review queue.
//!
//! Queues are auto-created on first enqueue; step numbers are 1-based
//! and strictly increasing per queue.

use async_trait::async_trait;
use spindle_core::error::QueueError;
use spindle_core::queue::{QueuedCommand, ReviewQueue};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An in-memory review queue.
pub struct InMemoryReviewQueue {
    queues: RwLock<HashMap<(String, String), Vec<QueuedCommand>>>,
}

impl InMemoryReviewQueue {
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot the steps of a queue (test accessor).
    pub async fn steps(&self, agent_name: &str, queue_name: &str) -> Vec<QueuedCommand> {
        self.queues
            .read()
            .await
            .get(&(agent_name.to_string(), queue_name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryReviewQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewQueue for InMemoryReviewQueue {
    async fn enqueue_step(
        &self,
        agent_name: &str,
        queue_name: &str,
        command: QueuedCommand,
    ) -> Result<u32, QueueError> {
        let mut queues = self.queues.write().await;
        let steps = queues
            .entry((agent_name.to_string(), queue_name.to_string()))
            .or_default();
        steps.push(command);
        Ok(steps.len() as u32)
    }
}
