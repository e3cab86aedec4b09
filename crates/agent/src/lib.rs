//! The spindle agent runtime.
//!
//! One interaction turn flows through five stages: placeholder
//! substitution and prompt assembly, response generation with bounded
//! retries, command extraction with a JSON repair loop, command
//! dispatch (direct execution or review queueing), and persistence of
//! the exchange. The [`InteractionLoop`] wires the stages to an
//! [`Agent`] and its collaborators; everything downstream of `run` is
//! failure-tolerant and degrades instead of erroring outward.

pub mod agent;
pub mod assembler;
pub mod dispatcher;
pub mod extractor;
pub mod generator;
pub mod session;

pub use agent::Agent;
pub use assembler::{
    AssembleRequest, AssembledPrompt, COMMANDS_PLACEHOLDER, DEFAULT_TEMPLATE_NAME, HISTORY_WINDOW,
    PromptAssembler,
};
pub use dispatcher::{CommandDispatcher, NO_COMMAND};
pub use extractor::{CommandExtractor, extract_balanced_object};
pub use generator::ResponseGenerator;
pub use session::{InteractionLoop, RunOptions};
