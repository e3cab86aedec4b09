//! Bounded retry around model generation.
//!
//! The first attempt goes straight to the agent's provider. Every
//! retry after a failure is routed through the request dispatch as a
//! fresh, smaller request: the context allowance is shrunk by one per
//! failure so repeated context-window overruns converge instead of
//! repeating. The failure counter is cumulative for the generator's
//! lifetime, so a session that keeps failing eventually degrades for
//! good rather than hammering the provider forever.

use spindle_core::provider::{PromptArgs, RequestDispatch};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::assembler::AssembledPrompt;

enum GenerationState {
    /// First attempt, sent directly to the provider.
    Direct,
    /// Retrying through the dispatch with shrunk context.
    Degrading,
}

/// Retry state machine around a single generation.
pub struct ResponseGenerator {
    dispatch: Arc<dyn RequestDispatch>,
    failures: AtomicU32,
}

impl ResponseGenerator {
    pub fn new(dispatch: Arc<dyn RequestDispatch>) -> Self {
        Self {
            dispatch,
            failures: AtomicU32::new(0),
        }
    }

    /// Lifetime failure count so far.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Generate a response for an assembled prompt. Returns `None`
    /// once the cumulative failure cap is reached.
    pub async fn generate(
        &self,
        agent: &Agent,
        prompt: &AssembledPrompt,
        template_name: &str,
        mut args: PromptArgs,
    ) -> Option<String> {
        let settings = agent.settings();
        let mut state = GenerationState::Direct;

        loop {
            let result = match state {
                GenerationState::Direct => {
                    agent.provider().instruct(&prompt.text, prompt.tokens).await
                }
                GenerationState::Degrading => {
                    self.dispatch
                        .prompt_agent(agent.name(), template_name, args.clone())
                        .await
                }
            };

            match result {
                Ok(text) => {
                    debug!(chars = text.len(), "Generation succeeded");
                    return Some(text);
                }
                Err(e) => {
                    let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(error = %e, failures, "Generation failed");

                    if failures >= settings.max_failures {
                        warn!(failures, "Failure cap reached, degrading");
                        if settings.reset_failures_on_exhaustion {
                            self.failures.store(0, Ordering::SeqCst);
                        }
                        return None;
                    }

                    // Retry with one less context passage each round.
                    args.context_results = args.context_results.saturating_sub(1);
                    sleep(Duration::from_secs(settings.retry_backoff_secs)).await;
                    state = GenerationState::Degrading;
                }
            }
        }
    }
}
