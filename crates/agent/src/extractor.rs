//! Extracting a command payload from free-form model output.
//!
//! Models wrap JSON in prose, code fences, and half-sentences, so the
//! extractor scans for the first balanced `{...}` region instead of
//! parsing the whole response. When the region is not valid JSON the
//! model itself is asked to reformat it, up to a fixed cap; a response
//! that never yields parseable JSON degrades to "no commands" rather
//! than failing the interaction.

use spindle_core::capability::CommandArgs;
use spindle_core::provider::{PromptArgs, RequestDispatch};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::agent::Agent;

/// Template that asks the model to reformat broken JSON.
const REPAIR_TEMPLATE: &str = "JSONFormatter";

/// Find the first balanced top-level `{...}` span in `text`.
///
/// String literals and escapes are honored, so braces inside a JSON
/// string do not affect the depth. Returns `None` when no balanced
/// object exists.
pub fn extract_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Bounded JSON repair loop around [`extract_balanced_object`].
pub struct CommandExtractor {
    dispatch: Arc<dyn RequestDispatch>,
}

impl CommandExtractor {
    pub fn new(dispatch: Arc<dyn RequestDispatch>) -> Self {
        Self { dispatch }
    }

    /// Extract the command payload from a response. Always returns a
    /// map; an empty map means "no commands" and is never an error.
    pub async fn extract(&self, agent: &Agent, response: &str, args: &PromptArgs) -> CommandArgs {
        let mut text = response.to_string();
        let mut args = args.clone();

        for attempt in 0..agent.settings().max_repair_attempts {
            let span = match extract_balanced_object(&text) {
                Some(span) => span,
                // Plain prose carries no commands; nothing to repair.
                None => return CommandArgs::new(),
            };

            match serde_json::from_str::<serde_json::Value>(span) {
                Ok(serde_json::Value::Object(map)) => {
                    debug!(keys = map.len(), "Extracted command payload");
                    return map;
                }
                Ok(other) => {
                    warn!(kind = ?other, "Balanced span is not a JSON object");
                    return CommandArgs::new();
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Command payload is malformed, asking for repair");
                    args.context_results = args.context_results.saturating_sub(1);
                    // The repair request keeps the original user
                    // input; the malformed text rides along as a
                    // template variable.
                    let mut repair_args = args.clone();
                    repair_args
                        .extra
                        .insert("unformatted_response".into(), text.clone());
                    match self
                        .dispatch
                        .prompt_agent(agent.name(), REPAIR_TEMPLATE, repair_args)
                        .await
                    {
                        Ok(reformatted) => text = reformatted,
                        Err(e) => {
                            warn!(error = %e, "Repair request failed");
                            return CommandArgs::new();
                        }
                    }
                }
            }
        }

        warn!("Repair cap reached, treating response as command-free");
        CommandArgs::new()
    }
}
