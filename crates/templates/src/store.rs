//! Prompt template store.
//!
//! Templates are named, categorized, and resolve to literal text
//! containing `{placeholder}` tokens. The store is a collaborator:
//! the assembler fetches per call (freshness over cache correctness)
//! and treats a lookup failure as "use the name as literal text".

use async_trait::async_trait;
use spindle_core::TemplateError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The template-store collaborator.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch a template's text by name within a category.
    async fn get_prompt(
        &self,
        name: &str,
        category: &str,
    ) -> std::result::Result<String, TemplateError>;
}

/// An in-memory template store keyed by (category, name).
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<(String, String), String>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Register a template, replacing any existing one with the same
    /// category and name.
    pub async fn register(
        &self,
        category: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.templates
            .write()
            .await
            .insert((category.into(), name.into()), content.into());
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get_prompt(
        &self,
        name: &str,
        category: &str,
    ) -> std::result::Result<String, TemplateError> {
        self.templates
            .read()
            .await
            .get(&(category.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
                category: category.to_string(),
            })
    }
}
