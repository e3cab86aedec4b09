//! Typed agent settings.
//!
//! The settings an interaction loop reads at runtime — autonomy flag,
//! working directory, helper agent, timeouts, retry knobs — live in a
//! single struct with documented defaults, deserialized from TOML and
//! validated once at agent construction. Unknown keys are rejected so
//! a typo'd setting fails loudly instead of silently falling back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Per-agent settings with documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSettings {
    /// Model identifier. Doubles as the default template category
    /// when the caller does not name one.
    #[serde(default = "default_model")]
    pub model: String,

    /// Whether resolved commands execute immediately (`true`) or are
    /// queued for manual review (`false`, default).
    #[serde(default)]
    pub autonomous_execution: bool,

    /// Working directory exposed to prompts as `{working_directory}`.
    #[serde(default = "default_working_directory")]
    pub working_directory: PathBuf,

    /// Helper agent exposed to prompts as `{helper_agent_name}`.
    /// Defaults to the agent's own name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_agent_name: Option<String>,

    /// Web search timeout in seconds; 0 means no timeout.
    #[serde(default)]
    pub websearch_timeout_secs: u64,

    /// Total generation failures tolerated over the session lifetime
    /// before `run` returns a degraded empty result.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Backoff between generation retries, in seconds.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Spacing between extra multi-shot samples, in seconds.
    #[serde(default = "default_shot_spacing_secs")]
    pub shot_spacing_secs: u64,

    /// Whether the failure counter resets after terminal exhaustion.
    /// Off by default: the counter bounds total session-lifetime
    /// flakiness rather than per-call flakiness.
    #[serde(default)]
    pub reset_failures_on_exhaustion: bool,

    /// Hard cap on JSON reformat attempts per extraction.
    #[serde(default = "default_max_repair_attempts")]
    pub max_repair_attempts: u32,

    /// Hard cap on corrective re-dispatch rounds per command batch.
    #[serde(default = "default_max_correction_rounds")]
    pub max_correction_rounds: u32,
}

fn default_model() -> String {
    "default".into()
}
fn default_working_directory() -> PathBuf {
    PathBuf::from("./WORKSPACE")
}
fn default_max_failures() -> u32 {
    5
}
fn default_retry_backoff_secs() -> u64 {
    10
}
fn default_shot_spacing_secs() -> u64 {
    1
}
fn default_max_repair_attempts() -> u32 {
    3
}
fn default_max_correction_rounds() -> u32 {
    3
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            autonomous_execution: false,
            working_directory: default_working_directory(),
            helper_agent_name: None,
            websearch_timeout_secs: 0,
            max_failures: default_max_failures(),
            retry_backoff_secs: default_retry_backoff_secs(),
            shot_spacing_secs: default_shot_spacing_secs(),
            reset_failures_on_exhaustion: false,
            max_repair_attempts: default_max_repair_attempts(),
            max_correction_rounds: default_max_correction_rounds(),
        }
    }
}

impl AgentSettings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Validate settings. Called once at agent construction.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.model.trim().is_empty() {
            return Err(SettingsError::Invalid("model must not be empty".into()));
        }
        if self.max_failures == 0 {
            return Err(SettingsError::Invalid(
                "max_failures must be at least 1".into(),
            ));
        }
        if self.max_repair_attempts == 0 {
            return Err(SettingsError::Invalid(
                "max_repair_attempts must be at least 1".into(),
            ));
        }
        if self.max_correction_rounds == 0 {
            return Err(SettingsError::Invalid(
                "max_correction_rounds must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The helper agent name, falling back to the agent's own name.
    pub fn helper_agent<'a>(&'a self, agent_name: &'a str) -> &'a str {
        self.helper_agent_name.as_deref().unwrap_or(agent_name)
    }
}
