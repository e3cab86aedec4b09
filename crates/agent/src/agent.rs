//! The agent handle: identity, typed settings, capabilities, provider.
//!
//! The interaction loop holds a read reference to this; the agent
//! itself is owned by whoever constructed it. Settings are validated
//! once here, so the loop never revalidates.

use spindle_config::{AgentSettings, SettingsError};
use spindle_core::capability::CapabilityRegistry;
use spindle_core::provider::Provider;
use std::sync::Arc;

/// An agent: a name, validated settings, a capability registry, and a
/// generation provider.
pub struct Agent {
    name: String,
    settings: AgentSettings,
    capabilities: Arc<CapabilityRegistry>,
    provider: Arc<dyn Provider>,
}

impl Agent {
    /// Create an agent, validating its settings.
    pub fn new(
        name: impl Into<String>,
        settings: AgentSettings,
        capabilities: Arc<CapabilityRegistry>,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            name: name.into(),
            settings,
            capabilities,
            provider,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// The capability list rendered for prompt injection.
    pub fn commands_string(&self) -> String {
        self.capabilities.commands_string()
    }
}
