//! Prompt assembly — turning a template, memory context, and
//! conversation history into the final prompt text.
//!
//! Assembly is best-effort by design: an unknown template name is
//! used as literal template text, an empty memory result renders as
//! no context, and unresolved placeholders survive substitution
//! verbatim. The assembler never mutates persisted state.

use spindle_core::interaction::ConversationLog;
use spindle_core::memory::{MemoryQuery, MemoryStore};
use spindle_core::token::Tokenizer;
use spindle_templates::{TemplateStore, TemplateValue, TemplateVars, substitute};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::Agent;

/// The placeholder that marks a template as command-capable. Whether
/// the command phase runs is a property of the template, not of the
/// response: `{command_list}` shows capabilities without enabling
/// execution, only this token enables it.
pub const COMMANDS_PLACEHOLDER: &str = "{COMMANDS}";

/// How many trailing interactions are replayed into the prompt.
/// Older history stays in the persisted log but is not replayed —
/// a context-window economy, not data loss.
pub const HISTORY_WINDOW: usize = 5;

/// Template name used when the caller supplies none.
pub const DEFAULT_TEMPLATE_NAME: &str = "Custom Input";

/// Per-call assembly inputs.
#[derive(Debug, Clone, Default)]
pub struct AssembleRequest {
    /// The user's input; when empty, the `user_input` extra variable
    /// is consulted.
    pub user_input: String,

    /// Template name; empty selects [`DEFAULT_TEMPLATE_NAME`].
    pub template_name: String,

    /// Template category; `None` defaults to the agent's model.
    pub category: Option<String>,

    /// Memory passages to inject; 0 opts out of context entirely.
    pub top_results: u32,

    /// Minimum relevance for retrieved passages.
    pub min_relevance_score: f32,

    /// Conversation to replay history from; empty generates a fresh
    /// UUID name.
    pub conversation_name: String,

    /// Optional second memory collection to union into the context.
    pub inject_collection: Option<String>,

    /// Caller-supplied template variables; these win on key collision
    /// with the standard variables.
    pub extra_vars: HashMap<String, String>,
}

/// The assembled prompt plus the raw template it came from.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// Final prompt text after substitution.
    pub text: String,

    /// The unformatted template text (used to detect the command
    /// placeholder).
    pub raw_template: String,

    /// Token count of the final prompt.
    pub tokens: usize,
}

/// The prompt assembler.
pub struct PromptAssembler {
    templates: Arc<dyn TemplateStore>,
    memory: Arc<dyn MemoryStore>,
    log: Arc<dyn ConversationLog>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl PromptAssembler {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        memory: Arc<dyn MemoryStore>,
        log: Arc<dyn ConversationLog>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            templates,
            memory,
            log,
            tokenizer,
        }
    }

    /// Assemble the final prompt for an agent.
    pub async fn assemble(&self, agent: &Agent, req: &AssembleRequest) -> AssembledPrompt {
        let user_input = if req.user_input.is_empty() {
            req.extra_vars.get("user_input").cloned().unwrap_or_default()
        } else {
            req.user_input.clone()
        };

        let template_name = if req.template_name.is_empty() {
            DEFAULT_TEMPLATE_NAME
        } else {
            &req.template_name
        };
        let category = req.category.as_deref().unwrap_or(&agent.settings().model);

        // Unknown template name → the name itself is the template.
        let raw_template = match self.templates.get_prompt(template_name, category).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Template lookup failed, using name as literal text");
                template_name.to_string()
            }
        };

        info!(context_results = req.top_results, "Assembling prompt");
        let context = self.retrieve_context(&user_input, req).await;

        let conversation_name = if req.conversation_name.is_empty() {
            spindle_core::fresh_conversation_name()
        } else {
            req.conversation_name.clone()
        };
        let conversation_history = self.render_history(agent.name(), &conversation_name).await;

        let mut vars = TemplateVars::new();
        vars.insert("user_input".into(), TemplateValue::from(user_input));
        vars.insert("agent_name".into(), TemplateValue::from(agent.name()));
        vars.insert("COMMANDS".into(), TemplateValue::from(agent.commands_string()));
        vars.insert("context".into(), TemplateValue::from(context));
        vars.insert(
            "command_list".into(),
            TemplateValue::from(agent.commands_string()),
        );
        vars.insert(
            "date".into(),
            TemplateValue::from(chrono::Local::now().format("%B %d, %Y %I:%M %p").to_string()),
        );
        vars.insert(
            "working_directory".into(),
            TemplateValue::from(agent.settings().working_directory.display().to_string()),
        );
        vars.insert(
            "helper_agent_name".into(),
            TemplateValue::from(agent.settings().helper_agent(agent.name())),
        );
        vars.insert(
            "conversation_history".into(),
            TemplateValue::from(conversation_history),
        );

        // Caller variables take precedence, except history which is
        // always the resolved one.
        for (key, value) in &req.extra_vars {
            if key == "conversation_history" {
                continue;
            }
            vars.insert(key.clone(), TemplateValue::from(value.as_str()));
        }

        let text = substitute(&raw_template, &vars);
        let tokens = self.tokenizer.count_tokens(&text);
        debug!(tokens, prompt = %text, "Assembled prompt");

        AssembledPrompt {
            text,
            raw_template,
            tokens,
        }
    }

    /// Retrieve and label memory context. Empty string when context
    /// is opted out (`top_results == 0`), the input is empty, or
    /// nothing relevant was found.
    async fn retrieve_context(&self, user_input: &str, req: &AssembleRequest) -> String {
        if req.top_results == 0 || user_input.is_empty() {
            return String::new();
        }

        let mut passages = match self
            .memory
            .get_memories(
                MemoryQuery::new(user_input, req.top_results as usize)
                    .with_min_relevance(req.min_relevance_score),
            )
            .await
        {
            Ok(passages) => passages,
            Err(e) => {
                warn!(error = %e, "Memory retrieval failed");
                Vec::new()
            }
        };

        if let Some(collection) = &req.inject_collection {
            match self
                .memory
                .get_memories(
                    MemoryQuery::new(user_input, req.top_results as usize)
                        .with_min_relevance(req.min_relevance_score)
                        .with_collection(collection.clone()),
                )
                .await
            {
                Ok(extra) => passages.extend(extra),
                Err(e) => warn!(error = %e, collection, "Secondary memory retrieval failed"),
            }
        }

        if passages.is_empty() {
            return String::new();
        }

        format!(
            "The user's input causes you remember these things:\n{}\n",
            passages.join("\n")
        )
    }

    /// Render the last [`HISTORY_WINDOW`] interactions, oldest first.
    async fn render_history(&self, agent_name: &str, conversation_name: &str) -> String {
        let interactions = match self.log.get_conversation(agent_name, conversation_name).await {
            Ok(interactions) => interactions,
            Err(e) => {
                warn!(error = %e, "History fetch failed");
                Vec::new()
            }
        };

        let start = interactions.len().saturating_sub(HISTORY_WINDOW);
        interactions[start..]
            .iter()
            .map(|i| i.render())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
