// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `memory_recall` and `memory_capture` tools.
//!
//! Store failures are reported as error outputs so the agent can carry on
//! with its turn. Finding nothing is a normal result, not an error.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::MnemoError;
use mnemo_skill::{Tool, ToolOutput, ToolRegistry};
use strum::VariantNames;
use tracing::warn;

use crate::store::MemoryStore;
use crate::types::{MemoryCategory, MemorySearchResult};

/// Result count when the caller gives no `limit`.
pub const DEFAULT_RECALL_LIMIT: usize = 5;

/// Output when a search finds nothing.
pub const NO_MEMORIES: &str = "No relevant memories found.";

/// Searches long-term memory.
pub struct RecallTool {
    store: Arc<MemoryStore>,
}

impl RecallTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecallTool {
    fn name(&self) -> &str {
        "memory_recall"
    }

    fn description(&self) -> &str {
        "Search long-term memory for information from previous conversations. \
         Use it when the user refers to something they told you before."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of memories to return (default 5)",
                    "minimum": 1
                },
                "category": {
                    "type": "string",
                    "enum": MemoryCategory::VARIANTS,
                    "description": "Only return memories of this category"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, MnemoError> {
        let Some(query) = input["query"].as_str().filter(|q| !q.trim().is_empty()) else {
            return Ok(ToolOutput::error("query parameter is required"));
        };
        let limit = input["limit"]
            .as_f64()
            .filter(|l| *l >= 1.0)
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_RECALL_LIMIT);

        let results = match input["category"].as_str() {
            Some(name) => {
                let Ok(category) = name.parse::<MemoryCategory>() else {
                    return Ok(ToolOutput::error(format!(
                        "unknown category `{name}`, expected one of {}",
                        MemoryCategory::VARIANTS.join(", ")
                    )));
                };
                self.store
                    .search_in_category(query, limit, 0.0, category)
                    .await
            }
            None => self.store.search(query, limit, 0.0).await,
        };

        match results {
            Ok(results) => Ok(ToolOutput::success(format_recall(&results))),
            Err(e) => {
                warn!(error = %e, "memory_recall failed");
                Ok(ToolOutput::error(format!("memory search failed: {e}")))
            }
        }
    }
}

/// Numbered listing of results, or [`NO_MEMORIES`].
pub fn format_recall(results: &[MemorySearchResult]) -> String {
    if results.is_empty() {
        return NO_MEMORIES.to_string();
    }
    let mut out = format!("Found {} relevant memories:\n\n", results.len());
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] (score: {:.2}) {}",
            i + 1,
            r.entry.category,
            r.score,
            r.entry.text
        );
    }
    out
}

/// Stores a memory explicitly.
pub struct CaptureTool {
    store: Arc<MemoryStore>,
}

impl CaptureTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CaptureTool {
    fn name(&self) -> &str {
        "memory_capture"
    }

    fn description(&self) -> &str {
        "Store a fact, preference, or decision in long-term memory so it can be \
         recalled in later conversations."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The information to remember"
                },
                "category": {
                    "type": "string",
                    "enum": MemoryCategory::VARIANTS,
                    "description": "Kind of memory (default other)"
                },
                "importance": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1,
                    "description": "How important this is, 0 to 1 (default 0.5)"
                }
            },
            "required": ["text"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, MnemoError> {
        let Some(text) = input["text"].as_str().filter(|t| !t.trim().is_empty()) else {
            return Ok(ToolOutput::error("text parameter is required"));
        };
        let category = input["category"]
            .as_str()
            .unwrap_or(MemoryCategory::Other.as_str());
        let importance = input["importance"].as_f64().unwrap_or(0.5) as f32;

        match self.store.store(text, importance, category, None).await {
            Ok(entry) => Ok(ToolOutput::success(format!(
                "Memory stored successfully (ID: {})",
                entry.id
            ))),
            Err(e) => {
                warn!(error = %e, "memory_capture failed");
                Ok(ToolOutput::error(format!("failed to store memory: {e}")))
            }
        }
    }
}

/// Registers both memory tools against one shared store.
pub fn register_memory_tools(
    registry: &mut ToolRegistry,
    store: Arc<MemoryStore>,
) -> Result<(), MnemoError> {
    registry.register(Arc::new(RecallTool::new(Arc::clone(&store))))?;
    registry.register(Arc::new(CaptureTool::new(store)))?;
    tracing::info!("memory tools registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::{Embedder, VocabularyEmbedder};
    use mnemo_config::MemoryConfig;

    async fn open_temp() -> (tempfile::TempDir, Arc<MemoryStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open_with_embedder(
            dir.path().join("vector.db"),
            Embedder::Vocabulary(VocabularyEmbedder::new()),
            MemoryConfig::default(),
        )
        .await
        .unwrap();
        (dir, Arc::new(store))
    }

    #[tokio::test]
    async fn recall_without_query_is_error_output() {
        let (_dir, store) = open_temp().await;
        let out = RecallTool::new(store)
            .invoke(serde_json::json!({}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.content, "query parameter is required");
    }

    #[tokio::test]
    async fn recall_on_empty_store_is_not_an_error() {
        let (_dir, store) = open_temp().await;
        let out = RecallTool::new(store)
            .invoke(serde_json::json!({ "query": "rust" }))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.content, NO_MEMORIES);
    }

    #[tokio::test]
    async fn capture_then_recall_formats_listing() {
        let (_dir, store) = open_temp().await;
        let capture = CaptureTool::new(Arc::clone(&store));
        let out = capture
            .invoke(serde_json::json!({
                "text": "I like rust code",
                "category": "preference",
                "importance": 0.9
            }))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert!(out.content.starts_with("Memory stored successfully (ID: "));

        let out = RecallTool::new(store)
            .invoke(serde_json::json!({ "query": "I like rust code", "limit": 3 }))
            .await
            .unwrap();
        assert_eq!(
            out.content,
            "Found 1 relevant memories:\n\n1. [preference] (score: 1.00) I like rust code\n"
        );
    }

    #[tokio::test]
    async fn recall_category_filter_and_unknown_category() {
        let (_dir, store) = open_temp().await;
        store.store("I like rust code", 0.5, "preference", None).await.unwrap();
        let recall = RecallTool::new(Arc::clone(&store));

        let out = recall
            .invoke(serde_json::json!({ "query": "rust code", "category": "fact" }))
            .await
            .unwrap();
        assert_eq!(out.content, NO_MEMORIES);

        let out = recall
            .invoke(serde_json::json!({ "query": "rust code", "category": "Preference" }))
            .await
            .unwrap();
        assert!(out.content.starts_with("Found 1 relevant memories"));

        let out = recall
            .invoke(serde_json::json!({ "query": "rust code", "category": "mood" }))
            .await
            .unwrap();
        assert!(out.is_error);
    }

    #[tokio::test]
    async fn capture_defaults_and_failures() {
        let (_dir, store) = open_temp().await;
        let capture = CaptureTool::new(Arc::clone(&store));

        let out = capture
            .invoke(serde_json::json!({ "text": "the user has a new job" }))
            .await
            .unwrap();
        let id = out
            .content
            .trim_start_matches("Memory stored successfully (ID: ")
            .trim_end_matches(')');
        let entry = store.get(id).await.unwrap().unwrap();
        assert_eq!(entry.category, MemoryCategory::Other);
        assert_eq!(entry.importance, 0.5);

        let out = capture.invoke(serde_json::json!({ "text": "" })).await.unwrap();
        assert!(out.is_error);

        // No vocabulary word: embedding has no signal, surfaced as error output.
        let out = capture
            .invoke(serde_json::json!({ "text": "zzz qqq" }))
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(out.content.starts_with("failed to store memory"));
    }

    #[tokio::test]
    async fn registration_exposes_both_tools() {
        let (_dir, store) = open_temp().await;
        let mut registry = ToolRegistry::new();
        register_memory_tools(&mut registry, store).unwrap();

        let names: Vec<&str> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["memory_capture", "memory_recall"]);

        let defs = registry.tool_definitions();
        assert_eq!(defs[1]["parameters"]["required"][0], "query");
        assert_eq!(
            defs[1]["parameters"]["properties"]["category"]["enum"][4],
            "other"
        );
    }
}
