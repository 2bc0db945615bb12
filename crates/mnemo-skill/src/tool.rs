// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! A [`Tool`] is an operation an agent can call by name with a JSON object
//! argument. The [`ToolRegistry`] resolves names to tools and produces the
//! function definitions handed to the model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::MnemoError;
use serde::{Deserialize, Serialize};

/// Result of a tool invocation as shown to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text returned to the agent.
    pub content: String,
    /// Whether the invocation failed. Failures are still reported as text.
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Failed output carrying an explanation for the agent.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// An operation exposed to an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup and in function definitions.
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema of the argument object.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Runs the tool with the parsed argument object.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, MnemoError>;
}

/// Tools indexed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its `name()`. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), MnemoError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(MnemoError::Validation(format!(
                "tool `{name}` is already registered"
            )));
        }
        tracing::debug!(tool = %name, "registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Looks up `name` and invokes it with `input`.
    pub async fn invoke(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ToolOutput, MnemoError> {
        let tool = self
            .get(name)
            .ok_or_else(|| MnemoError::NotFound(format!("tool `{name}`")))?;
        tracing::debug!(tool = %name, "invoking tool");
        tool.invoke(input).await
    }

    /// (name, description) pairs sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Function definitions sorted by name, shaped as
    /// `{"name": .., "description": .., "parameters": {..}}`.
    pub fn tool_definitions(&self) -> Vec<serde_json::Value> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters_schema(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
