// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory augmentation around a conversational turn.
//!
//! Before a turn, [`MemoryContext::enhance`] prefixes the user's message with
//! the memories most related to it. After the turn,
//! [`MemoryContext::capture_exchange`] offers both sides of the exchange to
//! auto-capture. Both are best effort: failures are logged, never returned.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::capture::{AutoCapture, CaptureRules, MEMORY_CONTEXT_MARKER};
use crate::store::MemoryStore;
use crate::types::MemorySearchResult;

/// Memories injected ahead of a message.
pub const CONTEXT_RESULTS: usize = 3;

/// Similarity a memory needs to be injected.
pub const CONTEXT_MIN_SCORE: f32 = 0.6;

const CONTEXT_CLOSE: &str = "</relevant-memories>";

/// Recall-before, capture-after wrapper for one shared store.
#[derive(Debug, Clone)]
pub struct MemoryContext {
    store: Arc<MemoryStore>,
    capture: AutoCapture,
    auto_capture: bool,
}

impl MemoryContext {
    /// Uses the store's `auto_capture` setting and the built-in rules.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_rules(store, CaptureRules::default())
    }

    pub fn with_rules(store: Arc<MemoryStore>, rules: CaptureRules) -> Self {
        let auto_capture = store.config().auto_capture;
        Self {
            capture: AutoCapture::with_rules(Arc::clone(&store), rules),
            store,
            auto_capture,
        }
    }

    pub fn auto_capture_enabled(&self) -> bool {
        self.auto_capture
    }

    /// Returns `content` prefixed with a block of related memories, or
    /// unchanged when nothing relevant is found or the search fails.
    pub async fn enhance(&self, content: &str) -> String {
        if content.trim().is_empty() {
            return content.to_string();
        }
        match self
            .store
            .search(content, CONTEXT_RESULTS, CONTEXT_MIN_SCORE)
            .await
        {
            Ok(memories) if memories.is_empty() => content.to_string(),
            Ok(memories) => {
                debug!(count = memories.len(), "injecting memories into prompt");
                format_context(&memories, content)
            }
            Err(e) => {
                warn!(error = %e, "memory search failed, continuing without context");
                content.to_string()
            }
        }
    }

    /// Auto-captures the user's message and the response. Returns how many
    /// memories were written.
    pub async fn capture_exchange(
        &self,
        user_text: &str,
        response: &str,
        session_key: Option<&str>,
    ) -> usize {
        if !self.auto_capture {
            return 0;
        }
        let mut written = 0;
        for (side, text) in [("user", user_text), ("response", response)] {
            match self.capture.capture(text, session_key).await {
                Ok(Some(entry)) => {
                    debug!(side, id = %entry.id, category = %entry.category, "captured memory");
                    written += 1;
                }
                Ok(None) => {}
                Err(e) => warn!(side, error = %e, "auto-capture failed"),
            }
        }
        written
    }
}

/// Renders the injected block followed by the original content.
pub fn format_context(memories: &[MemorySearchResult], content: &str) -> String {
    let mut out = String::new();
    out.push_str(MEMORY_CONTEXT_MARKER);
    out.push('\n');
    out.push_str("The following information from previous conversations may be relevant:\n\n");
    for (i, m) in memories.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", i + 1, m.entry.category, m.entry.text);
    }
    out.push_str(CONTEXT_CLOSE);
    out.push_str("\n\n");
    out.push_str(content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemoryCategory, MemoryEntry};

    #[test]
    fn format_lists_memories_in_order() {
        let make = |text: &str, category| MemorySearchResult {
            entry: MemoryEntry {
                id: "x".into(),
                text: text.into(),
                vector: vec![],
                importance: 0.5,
                category,
                session_key: None,
                created_at: chrono::Utc::now(),
            },
            score: 0.9,
        };
        let out = format_context(
            &[
                make("likes tea", MemoryCategory::Preference),
                make("lives in Brno", MemoryCategory::Fact),
            ],
            "What should I drink?",
        );
        assert_eq!(
            out,
            "<relevant-memories>\n\
             The following information from previous conversations may be relevant:\n\n\
             1. [preference] likes tea\n\
             2. [fact] lives in Brno\n\
             </relevant-memories>\n\n\
             What should I drink?"
        );
    }
}
