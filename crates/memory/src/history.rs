//! In-memory conversation log.
//!
//! Conversations are keyed by (agent, conversation name). A single
//! writer lock per append keeps each loop's own appends strictly
//! ordered; interleaving across loops is allowed.

use async_trait::async_trait;
use spindle_core::error::HistoryError;
use spindle_core::interaction::{ConversationLog, Interaction};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An in-memory conversation log.
pub struct InMemoryLog {
    conversations: RwLock<HashMap<(String, String), Vec<Interaction>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationLog for InMemoryLog {
    async fn get_conversation(
        &self,
        agent_name: &str,
        conversation_name: &str,
    ) -> Result<Vec<Interaction>, HistoryError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .get(&(agent_name.to_string(), conversation_name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn log_interaction(
        &self,
        agent_name: &str,
        conversation_name: &str,
        role: &str,
        message: &str,
    ) -> Result<(), HistoryError> {
        self.conversations
            .write()
            .await
            .entry((agent_name.to_string(), conversation_name.to_string()))
            .or_default()
            .push(Interaction::new(role, message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::interaction::USER_ROLE;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_conversation_is_empty() {
        let log = InMemoryLog::new();
        let interactions = log.get_conversation("Aria", "nope").await.unwrap();
        assert!(interactions.is_empty());
    }

    #[tokio::test]
    async fn appends_keep_order() {
        let log = InMemoryLog::new();
        for i in 0..8 {
            log.log_interaction("Aria", "c1", USER_ROLE, &format!("msg {i}"))
                .await
                .unwrap();
        }
        let interactions = log.get_conversation("Aria", "c1").await.unwrap();
        assert_eq!(interactions.len(), 8);
        assert_eq!(interactions[0].message, "msg 0");
        assert_eq!(interactions[7].message, "msg 7");
    }

    #[tokio::test]
    async fn conversations_are_isolated_by_agent_and_name() {
        let log = InMemoryLog::new();
        log.log_interaction("Aria", "c1", USER_ROLE, "a").await.unwrap();
        log.log_interaction("Aria", "c2", USER_ROLE, "b").await.unwrap();
        log.log_interaction("Bram", "c1", USER_ROLE, "c").await.unwrap();

        assert_eq!(log.get_conversation("Aria", "c1").await.unwrap().len(), 1);
        assert_eq!(log.get_conversation("Aria", "c2").await.unwrap().len(), 1);
        assert_eq!(log.get_conversation("Bram", "c1").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_preserve_per_conversation_order() {
        let log = Arc::new(InMemoryLog::new());

        let mut handles = Vec::new();
        for conv in 0..4 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("c{conv}");
                for i in 0..50 {
                    log.log_interaction("Aria", &name, USER_ROLE, &format!("{i}"))
                        .await
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        for conv in 0..4 {
            let interactions = log
                .get_conversation("Aria", &format!("c{conv}"))
                .await
                .unwrap();
            let order: Vec<String> = interactions.iter().map(|i| i.message.clone()).collect();
            let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
            assert_eq!(order, expected);
        }
    }
}
