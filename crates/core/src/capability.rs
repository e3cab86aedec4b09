//! Capability trait — the abstraction over agent-exposed actions.
//!
//! A capability is a named executable action the model can request by
//! its friendly name. Capabilities are registered once at agent
//! construction; the registry indexes them by friendly name so
//! dispatch is a map lookup instead of a linear scan. Duplicate
//! friendly names are rejected at registration, which preserves
//! first-registration-wins semantics without ambiguity.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CapabilityError;

/// Argument mapping for a capability invocation, as parsed from the
/// model's structured command JSON.
pub type CommandArgs = serde_json::Map<String, Value>;

/// The core Capability trait.
///
/// Each capability (web search, file write, etc.) implements this
/// trait and is registered in the [`CapabilityRegistry`].
#[async_trait]
pub trait Capability: Send + Sync {
    /// The friendly name the model uses to request this capability.
    fn friendly_name(&self) -> &str;

    /// A description of what this capability does (listed in prompts).
    fn description(&self) -> &str;

    /// Execute the capability with the given arguments.
    async fn execute(&self, args: &CommandArgs) -> std::result::Result<String, CapabilityError>;
}

/// A registry of available capabilities, indexed by friendly name.
///
/// Listing order follows registration order so prompt-injected
/// capability lists are deterministic.
pub struct CapabilityRegistry {
    entries: Vec<Arc<dyn Capability>>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a capability. Duplicate friendly names are rejected.
    pub fn register(
        &mut self,
        capability: Arc<dyn Capability>,
    ) -> std::result::Result<(), CapabilityError> {
        let name = capability.friendly_name().to_string();
        if self.index.contains_key(&name) {
            return Err(CapabilityError::DuplicateName(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(capability);
        Ok(())
    }

    /// Look up a capability by friendly name (case-sensitive).
    pub fn get(&self, friendly_name: &str) -> Option<&dyn Capability> {
        self.index
            .get(friendly_name)
            .map(|&i| self.entries[i].as_ref())
    }

    /// Execute a capability by friendly name.
    pub async fn execute(
        &self,
        friendly_name: &str,
        args: &CommandArgs,
    ) -> std::result::Result<String, CapabilityError> {
        let capability = self
            .get(friendly_name)
            .ok_or_else(|| CapabilityError::NotFound(friendly_name.to_string()))?;
        capability.execute(args).await
    }

    /// Friendly names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.friendly_name()).collect()
    }

    /// Render the capability list for prompt injection, one numbered
    /// line per capability.
    pub fn commands_string(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} - {}", i + 1, c.friendly_name(), c.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
