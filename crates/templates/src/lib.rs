//! Prompt templating for Spindle.
//!
//! Two halves: a non-strict `{name}` placeholder substitution engine
//! (unresolved tokens are a valid terminal state) and the template
//! store collaborator the prompt assembler fetches from.

pub mod store;
pub mod substitute;

pub use store::{InMemoryTemplateStore, TemplateStore};
pub use substitute::{TemplateValue, TemplateVars, substitute};
