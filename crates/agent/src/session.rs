//! The interaction loop — one turn of an agent, end to end.
//!
//! A turn ingests any linked pages, optionally runs a web search,
//! assembles the prompt, generates a response with bounded retries,
//! runs the command phase when the template enables it, then persists
//! the exchange. `run` never fails outward: every internal error
//! either degrades a feature or yields `None`, meaning "no usable
//! response this turn".

use regex_lite::Regex;
use spindle_core::interaction::{ConversationLog, USER_ROLE};
use spindle_core::memory::MemoryStore;
use spindle_core::provider::{PromptArgs, RequestDispatch};
use spindle_core::queue::ReviewQueue;
use spindle_core::token::{HeuristicTokenizer, Tokenizer};
use spindle_core::websearch::Websearch;
use spindle_templates::TemplateStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::assembler::{AssembleRequest, COMMANDS_PLACEHOLDER, PromptAssembler};
use crate::dispatcher::CommandDispatcher;
use crate::extractor::{CommandExtractor, extract_balanced_object};
use crate::generator::ResponseGenerator;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid URL pattern"));

/// Per-turn options for [`InteractionLoop::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The user's input for this turn.
    pub user_input: String,

    /// Template name to drive the turn.
    pub prompt: String,

    /// Memory passages to inject into the prompt.
    pub context_results: u32,

    /// Run a web search before assembling the prompt.
    pub websearch: bool,

    /// Search depth, and the sublink crawl budget for ingested pages.
    pub websearch_depth: u32,

    /// Number of responses to generate; above 1, responses are
    /// numbered and concatenated.
    pub shots: u32,

    /// Skip persisting the exchange to memory.
    pub disable_memory: bool,

    /// Conversation to continue; empty starts a fresh one.
    pub conversation_name: String,

    /// Ingest pages linked in the user input.
    pub browse_links: bool,

    /// Template category override.
    pub prompt_category: Option<String>,

    /// Minimum relevance for injected memory passages.
    pub min_relevance_score: f32,

    /// Extra memory collection to union into the context.
    pub inject_collection: Option<String>,

    /// Objective used for the search query when the input is empty.
    pub primary_objective: Option<String>,

    /// Task used for the search query when the input is empty.
    pub task: Option<String>,

    /// Extra template variables, passed through to assembly.
    pub extra_vars: HashMap<String, String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            user_input: String::new(),
            prompt: "Chat".into(),
            context_results: 5,
            websearch: false,
            websearch_depth: 3,
            shots: 1,
            disable_memory: false,
            conversation_name: String::new(),
            browse_links: false,
            prompt_category: None,
            min_relevance_score: 0.0,
            inject_collection: None,
            primary_objective: None,
            task: None,
            extra_vars: HashMap::new(),
        }
    }
}

/// One agent's interaction loop with its collaborators wired in.
pub struct InteractionLoop {
    agent: Arc<Agent>,
    templates: Arc<dyn TemplateStore>,
    memory: Arc<dyn MemoryStore>,
    log: Arc<dyn ConversationLog>,
    dispatch: Arc<dyn RequestDispatch>,
    assembler: PromptAssembler,
    generator: ResponseGenerator,
    dispatcher: CommandDispatcher,
    websearch: Option<Arc<dyn Websearch>>,
    browsed_links: Mutex<HashSet<String>>,
}

impl InteractionLoop {
    pub fn new(
        agent: Arc<Agent>,
        templates: Arc<dyn TemplateStore>,
        memory: Arc<dyn MemoryStore>,
        log: Arc<dyn ConversationLog>,
        queue: Arc<dyn ReviewQueue>,
        dispatch: Arc<dyn RequestDispatch>,
    ) -> Self {
        let assembler = PromptAssembler::new(
            templates.clone(),
            memory.clone(),
            log.clone(),
            Arc::new(HeuristicTokenizer),
        );
        let generator = ResponseGenerator::new(dispatch.clone());
        let dispatcher = CommandDispatcher::new(
            CommandExtractor::new(dispatch.clone()),
            queue,
            log.clone(),
            dispatch.clone(),
        );
        Self {
            agent,
            templates,
            memory,
            log,
            dispatch,
            assembler,
            generator,
            dispatcher,
            websearch: None,
            browsed_links: Mutex::new(HashSet::new()),
        }
    }

    /// Enable web search for this loop.
    pub fn with_websearch(mut self, websearch: Arc<dyn Websearch>) -> Self {
        self.websearch = Some(websearch);
        self
    }

    /// Replace the token counter used during prompt assembly.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.assembler = PromptAssembler::new(
            self.templates.clone(),
            self.memory.clone(),
            self.log.clone(),
            tokenizer,
        );
        self
    }

    /// Lifetime generation-failure count for this loop.
    pub fn failures(&self) -> u32 {
        self.generator.failures()
    }

    /// Run one turn. `None` means the turn degraded with no usable
    /// response; it is never an error the caller must handle.
    pub async fn run(&self, opts: RunOptions) -> Option<String> {
        let conversation_name = if opts.conversation_name.is_empty() {
            spindle_core::fresh_conversation_name()
        } else {
            opts.conversation_name.clone()
        };
        info!(
            agent = %self.agent.name(),
            conversation = %conversation_name,
            prompt = %opts.prompt,
            "Starting interaction turn"
        );

        if opts.browse_links {
            self.ingest_linked_pages(&opts).await;
        }
        if opts.websearch {
            self.run_websearch(&opts).await;
        }

        let mut extra_vars = opts.extra_vars.clone();
        if let Some(objective) = &opts.primary_objective {
            extra_vars.insert("primary_objective".into(), objective.clone());
        }
        if let Some(task) = &opts.task {
            extra_vars.insert("task".into(), task.clone());
        }

        let prompt = self
            .assembler
            .assemble(
                &self.agent,
                &AssembleRequest {
                    user_input: opts.user_input.clone(),
                    template_name: opts.prompt.clone(),
                    category: opts.prompt_category.clone(),
                    top_results: opts.context_results,
                    min_relevance_score: opts.min_relevance_score,
                    conversation_name: conversation_name.clone(),
                    inject_collection: opts.inject_collection.clone(),
                    extra_vars: extra_vars.clone(),
                },
            )
            .await;

        let args = PromptArgs {
            user_input: opts.user_input.clone(),
            context_results: opts.context_results,
            conversation_name: conversation_name.clone(),
            disable_memory: opts.disable_memory,
            shots: 1,
            extra: extra_vars,
        };

        let response = self
            .generator
            .generate(&self.agent, &prompt, &opts.prompt, args.clone())
            .await?;

        // The command phase is gated on the template, not the
        // response: only command-capable templates get one.
        let final_response = if prompt.raw_template.contains(COMMANDS_PLACEHOLDER) {
            let execution = self
                .dispatcher
                .dispatch(&self.agent, &response, &args, &conversation_name)
                .await;
            self.compose_final(&response, &execution)
        } else {
            response
        };

        if !final_response.is_empty() {
            self.persist_turn(&opts, &prompt.text, &final_response, &conversation_name)
                .await;
        }

        if opts.shots > 1 {
            return Some(
                self.run_extra_shots(&opts, args, final_response, &conversation_name)
                    .await,
            );
        }

        Some(final_response)
    }

    /// Merge the model response with the execution report. Autonomous
    /// agents answer in JSON, so the `response` field is lifted out
    /// and the executed commands are appended; a response that fails
    /// to parse is kept raw, with the report still appended.
    fn compose_final(&self, response: &str, execution: &str) -> String {
        if !self.agent.settings().autonomous_execution {
            return format!("{response}\n\n{execution}");
        }

        let parsed = extract_balanced_object(response)
            .and_then(|span| serde_json::from_str::<serde_json::Value>(span).ok());
        let Some(serde_json::Value::Object(map)) = parsed else {
            debug!("Autonomous response is not JSON, keeping it raw");
            return format!("{response}\n\n{execution}");
        };

        let mut parts = String::new();
        if let Some(serde_json::Value::String(text)) = map.get("response") {
            parts.push_str(text);
        }
        if let Some(commands) = map.get("commands").and_then(|c| c.as_object()) {
            if !commands.is_empty() {
                let rendered =
                    serde_json::to_string(commands).unwrap_or_else(|_| "{}".into());
                parts.push_str(&format!("\n\nCommands Executed:\n{rendered}"));
            }
        }
        parts.push_str(&format!("\n\nCommand Execution Response:\n{execution}"));
        parts
    }

    /// Persist the exchange: memory write and conversation log, both
    /// best-effort.
    async fn persist_turn(
        &self,
        opts: &RunOptions,
        prompt_text: &str,
        final_response: &str,
        conversation_name: &str,
    ) {
        if !opts.disable_memory {
            if let Err(e) = self.memory.write_text(&opts.user_input, final_response).await {
                warn!(error = %e, "Failed to persist response to memory");
            }
        }

        // An empty input means the turn was template-driven; the
        // formatted prompt is the closest thing to what the user said.
        let user_message = if opts.user_input.is_empty() {
            prompt_text
        } else {
            &opts.user_input
        };
        if let Err(e) = self
            .log
            .log_interaction(self.agent.name(), conversation_name, USER_ROLE, user_message)
            .await
        {
            warn!(error = %e, "Failed to log user turn");
        }
        if let Err(e) = self
            .log
            .log_interaction(
                self.agent.name(),
                conversation_name,
                self.agent.name(),
                final_response,
            )
            .await
        {
            warn!(error = %e, "Failed to log agent turn");
        }
    }

    /// Generate `shots - 1` additional responses through the dispatch
    /// and return the numbered concatenation.
    async fn run_extra_shots(
        &self,
        opts: &RunOptions,
        args: PromptArgs,
        first: String,
        conversation_name: &str,
    ) -> String {
        let mut responses = vec![first];
        for shot in 2..=opts.shots {
            sleep(Duration::from_secs(self.agent.settings().shot_spacing_secs)).await;
            match self
                .dispatch
                .prompt_agent(self.agent.name(), &opts.prompt, args.clone())
                .await
            {
                Ok(text) => responses.push(text),
                Err(e) => {
                    warn!(error = %e, shot, conversation = %conversation_name, "Extra shot failed")
                }
            }
        }
        responses
            .iter()
            .enumerate()
            .map(|(i, text)| format!("Response {}:\n{}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ingest every page linked in the user input, plus a bounded
    /// number of each page's own links.
    async fn ingest_linked_pages(&self, opts: &RunOptions) {
        let mut to_browse = Vec::new();
        {
            let mut visited = match self.browsed_links.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            for found in URL_PATTERN.find_iter(&opts.user_input) {
                let url = found.as_str().trim_end_matches(['.', ',', ')']);
                if visited.insert(url.to_string()) {
                    to_browse.push(url.to_string());
                }
            }
        }

        for url in to_browse {
            info!(url = %url, "Ingesting linked page");
            let links = match self.memory.write_website(&url).await {
                Ok((_, links)) => links,
                Err(e) => {
                    warn!(error = %e, url = %url, "Page ingestion failed");
                    continue;
                }
            };

            let mut crawled = 0u32;
            for link in links {
                if crawled >= opts.websearch_depth {
                    break;
                }
                let fresh = match self.browsed_links.lock() {
                    Ok(mut guard) => guard.insert(link.url.clone()),
                    Err(poisoned) => poisoned.into_inner().insert(link.url.clone()),
                };
                if !fresh {
                    continue;
                }
                debug!(url = %link.url, "Ingesting sublink");
                if let Err(e) = self.memory.write_website(&link.url).await {
                    warn!(error = %e, url = %link.url, "Sublink ingestion failed");
                }
                crawled += 1;
            }
        }
    }

    async fn run_websearch(&self, opts: &RunOptions) {
        let Some(websearch) = &self.websearch else {
            debug!("Web search requested but no search backend is wired in");
            return;
        };

        // A query is derivable from the user input or from a full
        // objective/task pair; anything else has nothing to search.
        let query = if !opts.user_input.is_empty() {
            opts.user_input.clone()
        } else {
            let (Some(objective), Some(task)) = (&opts.primary_objective, &opts.task) else {
                debug!("No derivable search query, skipping web search");
                return;
            };
            format!("Primary Objective: {objective}\n\nTask: {task}")
        };

        if let Err(e) = websearch
            .search(
                &query,
                opts.websearch_depth,
                self.agent.settings().websearch_timeout_secs,
            )
            .await
        {
            warn!(error = %e, "Web search failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use spindle_config::AgentSettings;
    use spindle_core::capability::{Capability, CapabilityRegistry, CommandArgs};
    use spindle_core::error::{CapabilityError, ProviderError, WebsearchError};
    use spindle_core::memory::PageLink;
    use spindle_core::provider::Provider;
    use spindle_memory::{InMemoryLog, InMemoryReviewQueue, InMemoryStore};
    use spindle_templates::InMemoryTemplateStore;

    struct FixedProvider {
        response: String,
    }

    #[async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn instruct(&self, _p: &str, _t: usize) -> Result<String, ProviderError> {
            Ok(self.response.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        async fn instruct(&self, _p: &str, _t: usize) -> Result<String, ProviderError> {
            Err(ProviderError::GenerationFailed("down".into()))
        }
    }

    struct SearchWeb {
        calls: std::sync::Mutex<Vec<CommandArgs>>,
    }

    #[async_trait]
    impl Capability for SearchWeb {
        fn friendly_name(&self) -> &str {
            "SearchWeb"
        }
        fn description(&self) -> &str {
            "Searches the web"
        }
        async fn execute(&self, args: &CommandArgs) -> Result<String, CapabilityError> {
            self.calls.lock().unwrap().push(args.clone());
            Ok("search results".into())
        }
    }

    struct ScriptedDispatch {
        responses: std::sync::Mutex<Vec<Result<String, ProviderError>>>,
        calls: std::sync::Mutex<Vec<(String, PromptArgs)>>,
    }

    impl ScriptedDispatch {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses),
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RequestDispatch for ScriptedDispatch {
        async fn prompt_agent(
            &self,
            _agent_name: &str,
            prompt_name: &str,
            args: PromptArgs,
        ) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push((prompt_name.into(), args));
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(ProviderError::Timeout("timed out".into()))
            } else {
                responses.remove(0)
            }
        }
    }

    struct CountingSearch {
        queries: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Websearch for CountingSearch {
        async fn search(
            &self,
            query: &str,
            _depth: u32,
            _timeout_secs: u64,
        ) -> Result<(), WebsearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(())
        }
    }

    struct Harness {
        interaction: InteractionLoop,
        memory: Arc<InMemoryStore>,
        log: Arc<InMemoryLog>,
        dispatch: Arc<ScriptedDispatch>,
        search: Arc<SearchWeb>,
        templates: Arc<InMemoryTemplateStore>,
    }

    async fn harness(
        settings: AgentSettings,
        provider: Arc<dyn Provider>,
        dispatch_responses: Vec<Result<String, ProviderError>>,
    ) -> Harness {
        let search = Arc::new(SearchWeb {
            calls: std::sync::Mutex::new(Vec::new()),
        });
        let mut registry = CapabilityRegistry::new();
        registry.register(search.clone()).unwrap();

        let agent =
            Arc::new(Agent::new("Aria", settings, Arc::new(registry), provider).unwrap());

        let templates = Arc::new(InMemoryTemplateStore::new());
        templates.register("default", "Chat", "{user_input}").await;
        templates
            .register("default", "Instruct", "{user_input}\n{COMMANDS}")
            .await;

        let memory = Arc::new(InMemoryStore::new());
        let log = Arc::new(InMemoryLog::new());
        let dispatch = Arc::new(ScriptedDispatch::new(dispatch_responses));
        let interaction = InteractionLoop::new(
            agent,
            templates.clone(),
            memory.clone(),
            log.clone(),
            Arc::new(InMemoryReviewQueue::new()),
            dispatch.clone(),
        );

        Harness {
            interaction,
            memory,
            log,
            dispatch,
            search,
            templates,
        }
    }

    #[tokio::test]
    async fn plain_chat_returns_raw_response() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "Rust is a systems language.".into(),
            }),
            vec![],
        )
        .await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "what is rust".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await;

        assert_eq!(out.as_deref(), Some("Rust is a systems language."));
        // No command phase on a template without the marker.
        assert!(h.search.calls.lock().unwrap().is_empty());
        assert!(h.dispatch.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exchange_is_logged_and_remembered() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "An answer.".into(),
            }),
            vec![],
        )
        .await;

        h.interaction
            .run(RunOptions {
                user_input: "a question".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let conversation = h.log.get_conversation("Aria", "c1").await.unwrap();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].role, USER_ROLE);
        assert_eq!(conversation[0].message, "a question");
        assert_eq!(conversation[1].role, "Aria");
        assert_eq!(conversation[1].message, "An answer.");

        assert!(h.memory.passage_count("default").await > 0);
    }

    #[tokio::test]
    async fn disable_memory_skips_persistence() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "An answer.".into(),
            }),
            vec![],
        )
        .await;

        h.interaction
            .run(RunOptions {
                user_input: "a question".into(),
                conversation_name: "c1".into(),
                disable_memory: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(h.memory.passage_count("default").await, 0);
        // The conversation log is not memory; it still records.
        let conversation = h.log.get_conversation("Aria", "c1").await.unwrap();
        assert_eq!(conversation.len(), 2);
    }

    #[tokio::test]
    async fn autonomous_command_turn_executes_and_composes() {
        let response =
            r#"{"response": "Looking that up.", "commands": {"SearchWeb": {"query": "cats"}}}"#;
        let h = harness(
            AgentSettings {
                autonomous_execution: true,
                ..Default::default()
            },
            Arc::new(FixedProvider {
                response: response.into(),
            }),
            vec![],
        )
        .await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "find cats".into(),
                prompt: "Instruct".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(out.starts_with("Looking that up."));
        assert!(out.contains("Commands Executed:"));
        assert!(out.contains("Command Execution Response:"));
        assert!(out.contains("search results"));
        assert_eq!(h.search.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn autonomous_non_json_response_keeps_execution_report() {
        // A command-capable template, but the model answered in prose:
        // the raw response is kept and the report is still appended.
        let h = harness(
            AgentSettings {
                autonomous_execution: true,
                ..Default::default()
            },
            Arc::new(FixedProvider {
                response: "Just prose, no JSON here.".into(),
            }),
            vec![],
        )
        .await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "find cats".into(),
                prompt: "Instruct".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(out.starts_with("Just prose, no JSON here."));
        assert!(out.contains("No commands were executed."));
    }

    #[tokio::test]
    async fn non_autonomous_command_turn_concatenates() {
        let response = r#"{"commands": {"SearchWeb": {"query": "cats"}}}"#;
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: response.into(),
            }),
            vec![],
        )
        .await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "find cats".into(),
                prompt: "Instruct".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(out.starts_with(response));
        assert!(out.contains("added to a chain called 'Aria Command Suggestions'"));
        assert!(h.search.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn degraded_turn_returns_none() {
        let h = harness(AgentSettings::default(), Arc::new(FailingProvider), vec![]).await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "hello".into(),
                conversation_name: "c1".into(),
                ..Default::default()
            })
            .await;

        assert!(out.is_none());
        assert_eq!(h.interaction.failures(), 5);
        assert!(h.log.get_conversation("Aria", "c1").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn extra_shots_are_numbered() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "first".into(),
            }),
            vec![Ok("second".into()), Ok("third".into())],
        )
        .await;

        let out = h
            .interaction
            .run(RunOptions {
                user_input: "hello".into(),
                conversation_name: "c1".into(),
                shots: 3,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            out,
            "Response 1:\nfirst\nResponse 2:\nsecond\nResponse 3:\nthird"
        );
        assert_eq!(h.dispatch.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn linked_pages_are_ingested_with_bounded_crawl() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "ok".into(),
            }),
            vec![],
        )
        .await;

        let sublinks: Vec<PageLink> = (0..6)
            .map(|i| PageLink {
                label: format!("sub {i}"),
                url: format!("https://example.com/sub/{i}"),
            })
            .collect();
        h.memory
            .seed_website("https://example.com/docs", "Docs index page", sublinks)
            .await;
        for i in 0..6 {
            h.memory
                .seed_website(
                    format!("https://example.com/sub/{i}"),
                    format!("Sub page {i}"),
                    vec![],
                )
                .await;
        }

        h.interaction
            .run(RunOptions {
                user_input: "summarize https://example.com/docs please".into(),
                conversation_name: "c1".into(),
                browse_links: true,
                websearch_depth: 3,
                disable_memory: true,
                ..Default::default()
            })
            .await
            .unwrap();

        // The page itself plus at most `websearch_depth` sublinks.
        assert_eq!(h.memory.passage_count("default").await, 4);
    }

    #[tokio::test]
    async fn websearch_query_falls_back_to_objective() {
        let search = Arc::new(CountingSearch {
            queries: std::sync::Mutex::new(Vec::new()),
        });
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "ok".into(),
            }),
            vec![],
        )
        .await;
        let interaction = h.interaction.with_websearch(search.clone());

        interaction
            .run(RunOptions {
                user_input: String::new(),
                prompt: "Chat".into(),
                conversation_name: "c1".into(),
                websearch: true,
                primary_objective: Some("ship the release".into()),
                task: Some("write the changelog".into()),
                ..Default::default()
            })
            .await;

        let queries = search.queries.lock().unwrap();
        assert_eq!(
            queries[0],
            "Primary Objective: ship the release\n\nTask: write the changelog"
        );
    }

    #[tokio::test]
    async fn websearch_skipped_when_no_query_is_derivable() {
        let search = Arc::new(CountingSearch {
            queries: std::sync::Mutex::new(Vec::new()),
        });
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "ok".into(),
            }),
            vec![],
        )
        .await;
        let interaction = h.interaction.with_websearch(search.clone());

        // Empty input and no objective/task pair: nothing to search.
        interaction
            .run(RunOptions {
                user_input: String::new(),
                prompt: "Chat".into(),
                conversation_name: "c1".into(),
                websearch: true,
                ..Default::default()
            })
            .await;

        assert!(search.queries.lock().unwrap().is_empty());

        // A lone objective without a task is still not derivable.
        interaction
            .run(RunOptions {
                user_input: String::new(),
                prompt: "Chat".into(),
                conversation_name: "c1".into(),
                websearch: true,
                primary_objective: Some("ship the release".into()),
                ..Default::default()
            })
            .await;

        assert!(search.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn template_driven_turn_logs_formatted_prompt() {
        let h = harness(
            AgentSettings::default(),
            Arc::new(FixedProvider {
                response: "done".into(),
            }),
            vec![],
        )
        .await;
        h.templates
            .register("default", "Summarize", "Summarize the task: {task}")
            .await;

        h.interaction
            .run(RunOptions {
                user_input: String::new(),
                prompt: "Summarize".into(),
                conversation_name: "c1".into(),
                task: Some("refactor the parser".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let conversation = h.log.get_conversation("Aria", "c1").await.unwrap();
        assert_eq!(conversation[0].role, USER_ROLE);
        assert_eq!(
            conversation[0].message,
            "Summarize the task: refactor the parser"
        );
    }
}
