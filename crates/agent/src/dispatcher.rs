//! Command dispatch — acting on the commands a response asked for.
//!
//! Execution mode is an agent-level setting: autonomous agents run
//! resolved commands directly, everything else queues them for manual
//! review. A failed execution is fed back to the model for a corrected
//! response, up to a fixed number of rounds; exhausting the cap
//! degrades to "no commands" rather than failing the interaction.

use serde_json::Value;
use spindle_core::capability::CommandArgs;
use spindle_core::interaction::{ConversationLog, EXECUTOR_ROLE};
use spindle_core::provider::{PromptArgs, RequestDispatch};
use spindle_core::queue::{QueuedCommand, ReviewQueue};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::extractor::CommandExtractor;

/// Sentinel command name meaning "deliberately no command".
pub const NO_COMMAND: &str = "None.";

/// Template that asks the model to correct a failed command call.
const VALIDATION_TEMPLATE: &str = "ValidationFailed";

const NO_COMMANDS_MESSAGE: &str = "\nNo commands were executed.\n";

/// Executes or queues the commands found in a response.
pub struct CommandDispatcher {
    extractor: CommandExtractor,
    queue: Arc<dyn ReviewQueue>,
    log: Arc<dyn ConversationLog>,
    dispatch: Arc<dyn RequestDispatch>,
}

impl CommandDispatcher {
    pub fn new(
        extractor: CommandExtractor,
        queue: Arc<dyn ReviewQueue>,
        log: Arc<dyn ConversationLog>,
        dispatch: Arc<dyn RequestDispatch>,
    ) -> Self {
        Self {
            extractor,
            queue,
            log,
            dispatch,
        }
    }

    /// Dispatch every command named in `response`. Returns a
    /// human-readable execution report; the report for a response
    /// without commands is a fixed "no commands" line.
    pub async fn dispatch(
        &self,
        agent: &Agent,
        response: &str,
        args: &PromptArgs,
        conversation_name: &str,
    ) -> String {
        let mut response = response.to_string();

        for round in 0..agent.settings().max_correction_rounds {
            let payload = self.extractor.extract(agent, &response, args).await;
            let commands = match payload.get("commands") {
                Some(Value::Object(map)) if !map.is_empty() => map.clone(),
                _ => return NO_COMMANDS_MESSAGE.into(),
            };

            match self
                .run_batch(agent, &commands, &response, args, round)
                .await
            {
                BatchOutcome::Done(messages) => {
                    let report = messages.join("\n");
                    if let Err(e) = self
                        .log
                        .log_interaction(agent.name(), conversation_name, EXECUTOR_ROLE, &report)
                        .await
                    {
                        warn!(error = %e, "Failed to log execution report");
                    }
                    return format!("\n{report}\n");
                }
                BatchOutcome::NoCommands => return NO_COMMANDS_MESSAGE.into(),
                BatchOutcome::Corrected(corrected) => response = corrected,
            }
        }

        warn!("Correction cap reached, giving up on command execution");
        NO_COMMANDS_MESSAGE.into()
    }

    async fn run_batch(
        &self,
        agent: &Agent,
        commands: &serde_json::Map<String, Value>,
        response: &str,
        args: &PromptArgs,
        round: u32,
    ) -> BatchOutcome {
        let mut messages = Vec::new();

        for (name, value) in commands {
            if agent.capabilities().get(name).is_none() {
                if name == NO_COMMAND {
                    return BatchOutcome::NoCommands;
                }
                // An unknown name aborts the rest of the batch.
                warn!(command = %name, "Response named an unknown command");
                messages.push(format!("Command not recognized: `{name}`."));
                return BatchOutcome::Done(messages);
            }

            let command_args = match value {
                Value::Object(map) => map.clone(),
                _ => CommandArgs::new(),
            };

            if agent.settings().autonomous_execution {
                match self.execute(agent, name, &command_args, response, args, round).await {
                    ExecOutcome::Output(message) => messages.push(message),
                    ExecOutcome::Corrected(corrected) => {
                        return BatchOutcome::Corrected(corrected);
                    }
                    ExecOutcome::GiveUp => return BatchOutcome::NoCommands,
                }
            } else {
                messages.push(self.enqueue(agent, name, command_args).await);
            }
        }

        BatchOutcome::Done(messages)
    }

    async fn execute(
        &self,
        agent: &Agent,
        name: &str,
        command_args: &CommandArgs,
        response: &str,
        args: &PromptArgs,
        round: u32,
    ) -> ExecOutcome {
        info!(command = %name, "Executing command");
        match agent.capabilities().execute(name, command_args).await {
            Ok(output) => {
                let rendered_args =
                    serde_json::to_string(command_args).unwrap_or_else(|_| "{}".into());
                ExecOutcome::Output(format!(
                    "Executed Command: {name} with args {rendered_args}.\nCommand Output: {output}"
                ))
            }
            Err(e) => {
                warn!(command = %name, error = %e, round, "Command failed, requesting correction");
                let mut correction_args = args.clone();
                correction_args.user_input = response.to_string();
                correction_args
                    .extra
                    .insert("command_name".into(), name.to_string());
                correction_args.extra.insert(
                    "command_args".into(),
                    serde_json::to_string(command_args).unwrap_or_else(|_| "{}".into()),
                );
                correction_args
                    .extra
                    .insert("command_output".into(), e.to_string());

                match self
                    .dispatch
                    .prompt_agent(agent.name(), VALIDATION_TEMPLATE, correction_args)
                    .await
                {
                    Ok(corrected) => ExecOutcome::Corrected(corrected),
                    Err(e) => {
                        warn!(error = %e, "Correction request failed");
                        ExecOutcome::GiveUp
                    }
                }
            }
        }
    }

    async fn enqueue(&self, agent: &Agent, name: &str, command_args: CommandArgs) -> String {
        let queue_name = format!("{} Command Suggestions", agent.name());
        let command = QueuedCommand {
            command_name: name.to_string(),
            command_args,
        };
        match self.queue.enqueue_step(agent.name(), &queue_name, command).await {
            Ok(step) => {
                debug!(command = %name, step, queue = %queue_name, "Queued command for review");
                format!(
                    "The command has been added to a chain called '{queue_name}' \
                     for you to review and execute manually."
                )
            }
            Err(e) => {
                warn!(error = %e, command = %name, "Failed to queue command");
                format!("Failed to queue command: `{name}`.")
            }
        }
    }
}

enum BatchOutcome {
    Done(Vec<String>),
    NoCommands,
    Corrected(String),
}

enum ExecOutcome {
    Output(String),
    Corrected(String),
    GiveUp,
}
