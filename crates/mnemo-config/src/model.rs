// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Memory store and embedding settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Auto-capture gate limits.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Diagnostic log settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which embedding backend a store is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Remote OpenAI-compatible `/embeddings` endpoint.
    #[serde(alias = "remote")]
    OpenAi,
    /// Local model file, with an optional companion `embed.py` script.
    Local,
    /// Built-in vocabulary term-frequency vectors; needs nothing external.
    #[default]
    #[serde(alias = "simple")]
    Vocabulary,
}

impl std::fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderKind::OpenAi => write!(f, "openai"),
            EmbeddingProviderKind::Local => write!(f, "local"),
            EmbeddingProviderKind::Vocabulary => write!(f, "vocabulary"),
        }
    }
}

/// Memory store configuration. Immutable once a store is opened with it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Path to the SQLite file holding all memories.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Embedding backend selector.
    #[serde(default)]
    pub embedding_provider: EmbeddingProviderKind,

    /// Model identifier sent to the remote embedding endpoint.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// API key for the remote provider. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API (without `/embeddings`).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model file for the local provider. Conventional locations are
    /// probed when unset.
    #[serde(default)]
    pub local_model_path: Option<String>,

    /// Default minimum cosine similarity for search results (0.0-1.0].
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Default maximum number of search results.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Number of most recent memories scored per search.
    #[serde(default = "default_candidate_window")]
    pub candidate_window: usize,

    /// Whether conversation text is captured automatically.
    #[serde(default = "default_auto_capture")]
    pub auto_capture: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            embedding_provider: EmbeddingProviderKind::default(),
            embedding_model: default_embedding_model(),
            api_key: None,
            api_base_url: default_api_base_url(),
            local_model_path: None,
            min_score: default_min_score(),
            max_results: default_max_results(),
            candidate_window: default_candidate_window(),
            auto_capture: default_auto_capture(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mnemo").join("memory").join("vector.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vector.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_min_score() -> f32 {
    0.5
}

fn default_max_results() -> usize {
    5
}

fn default_candidate_window() -> usize {
    1000
}

fn default_auto_capture() -> bool {
    true
}

/// Limits applied by the auto-capture gate before any pattern matching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// Shortest text (in characters) worth capturing.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Longest text (in characters) still treated as a single fact.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Texts with more emoji than this are treated as chat noise.
    #[serde(default = "default_max_emoji")]
    pub max_emoji: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
            max_emoji: default_max_emoji(),
        }
    }
}

fn default_min_chars() -> usize {
    10
}

fn default_max_chars() -> usize {
    500
}

fn default_max_emoji() -> usize {
    3
}

/// Log output settings consumed by the binary's tracing subscriber.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for mnemo crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MnemoConfig::default();
        assert_eq!(config.memory.embedding_provider, EmbeddingProviderKind::Vocabulary);
        assert_eq!(config.memory.embedding_model, "text-embedding-3-small");
        assert!((config.memory.min_score - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.memory.max_results, 5);
        assert_eq!(config.memory.candidate_window, 1000);
        assert!(config.memory.auto_capture);
        assert!(config.memory.database_path.ends_with("vector.db"));
        assert_eq!(config.capture.min_chars, 10);
        assert_eq!(config.capture.max_chars, 500);
        assert_eq!(config.capture.max_emoji, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn provider_kind_accepts_aliases() {
        let kind: EmbeddingProviderKind = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(kind, EmbeddingProviderKind::Vocabulary);
        let kind: EmbeddingProviderKind = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(kind, EmbeddingProviderKind::OpenAi);
        let kind: EmbeddingProviderKind = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(kind, EmbeddingProviderKind::OpenAi);
        assert_eq!(EmbeddingProviderKind::Local.to_string(), "local");
    }
}
