// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each returns the text to print.

use std::sync::Arc;

use clap::Subcommand;
use mnemo_config::MnemoConfig;
use mnemo_core::MnemoError;
use mnemo_memory::tool::format_recall;
use mnemo_memory::{AutoCapture, CaptureRules, MemoryCategory, MemoryStore, register_memory_tools};
use mnemo_skill::ToolRegistry;

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a memory explicitly.
    Remember {
        /// Text to remember.
        text: String,
        /// preference, decision, entity, fact or other.
        #[arg(long, default_value = "other")]
        category: String,
        /// Importance between 0 and 1.
        #[arg(long, default_value_t = 0.5)]
        importance: f32,
        /// Session the memory belongs to.
        #[arg(long)]
        session: Option<String>,
    },
    /// Search memories by meaning.
    Recall {
        query: String,
        /// Maximum results (0 uses memory.max_results).
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Minimum similarity (0 uses memory.min_score).
        #[arg(long, default_value_t = 0.0)]
        min_score: f32,
        /// Only search this category.
        #[arg(long)]
        category: Option<MemoryCategory>,
    },
    /// Run text through auto-capture and store it if it qualifies.
    Capture {
        text: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Delete a memory by id.
    Forget { id: String },
    /// Print the number of stored memories.
    Count,
    /// Print the tool definitions exposed to agents, as JSON.
    Tools,
    /// Print the effective configuration with secrets redacted.
    Config,
}

/// Executes `command` against the store described by `config`.
pub async fn run(command: Command, config: &MnemoConfig) -> Result<String, MnemoError> {
    if let Command::Config = command {
        return render_config(config);
    }

    let store = Arc::new(MemoryStore::open(&config.memory).await?);
    let output = execute(command, config, Arc::clone(&store)).await;

    if let Ok(store) = Arc::try_unwrap(store) {
        store.close().await?;
    }
    output
}

async fn execute(
    command: Command,
    config: &MnemoConfig,
    store: Arc<MemoryStore>,
) -> Result<String, MnemoError> {
    match command {
        Command::Remember {
            text,
            category,
            importance,
            session,
        } => {
            let entry = store
                .store(&text, importance, &category, session.as_deref())
                .await?;
            Ok(format!("Stored {} [{}]\n", entry.id, entry.category))
        }
        Command::Recall {
            query,
            limit,
            min_score,
            category,
        } => {
            let results = match category {
                Some(category) => {
                    store
                        .search_in_category(&query, limit, min_score, category)
                        .await?
                }
                None => store.search(&query, limit, min_score).await?,
            };
            let mut out = format_recall(&results);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            Ok(out)
        }
        Command::Capture { text, session } => {
            let rules = CaptureRules::with_limits(config.capture.clone());
            let capture = AutoCapture::with_rules(Arc::clone(&store), rules);
            match capture.capture(&text, session.as_deref()).await? {
                Some(entry) => Ok(format!(
                    "Captured {} [{}] importance {:.2}\n",
                    entry.id, entry.category, entry.importance
                )),
                None => Ok("Not captured: text did not pass the capture rules\n".to_string()),
            }
        }
        Command::Forget { id } => {
            store.delete(&id).await?;
            Ok(format!("Deleted {}\n", id.to_ascii_lowercase()))
        }
        Command::Count => Ok(format!("{}\n", store.count().await?)),
        Command::Tools => {
            let mut registry = ToolRegistry::new();
            register_memory_tools(&mut registry, store)?;
            let json = serde_json::to_string_pretty(&registry.tool_definitions())
                .map_err(|e| MnemoError::Internal(format!("failed to encode tools: {e}")))?;
            Ok(format!("{json}\n"))
        }
        Command::Config => render_config(config),
    }
}

fn render_config(config: &MnemoConfig) -> Result<String, MnemoError> {
    let mut shown = config.clone();
    if shown.memory.api_key.is_some() {
        shown.memory.api_key = Some("[REDACTED]".to_string());
    }
    mnemo_config::render_toml(&shown).map_err(|e| MnemoError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &tempfile::TempDir) -> MnemoConfig {
        let mut config = MnemoConfig::default();
        config.memory.database_path = dir
            .path()
            .join("vector.db")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[tokio::test]
    async fn remember_recall_forget_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);

        let out = run(
            Command::Remember {
                text: "I like rust code".into(),
                category: "preference".into(),
                importance: 0.5,
                session: None,
            },
            &config,
        )
        .await
        .unwrap();
        assert!(out.starts_with("Stored "));
        assert!(out.ends_with(" [preference]\n"));
        let id = out
            .trim_start_matches("Stored ")
            .trim_end_matches(" [preference]\n")
            .to_string();

        let out = run(
            Command::Recall {
                query: "rust code".into(),
                limit: 0,
                min_score: 0.0,
                category: Some(MemoryCategory::Preference),
            },
            &config,
        )
        .await
        .unwrap();
        assert!(out.starts_with("Found 1 relevant memories:"));

        assert_eq!(run(Command::Count, &config).await.unwrap(), "1\n");
        let out = run(Command::Forget { id: id.clone() }, &config).await.unwrap();
        assert_eq!(out, format!("Deleted {id}\n"));
        assert_eq!(run(Command::Count, &config).await.unwrap(), "0\n");
    }

    #[tokio::test]
    async fn capture_reports_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);
        let out = run(
            Command::Capture {
                text: "just chatting here".into(),
                session: None,
            },
            &config,
        )
        .await
        .unwrap();
        assert!(out.starts_with("Not captured"));

        let out = run(
            Command::Capture {
                text: "I always want tests before deploy".into(),
                session: Some("cli".into()),
            },
            &config,
        )
        .await
        .unwrap();
        assert!(out.contains("[preference] importance 0.70"));
    }

    #[tokio::test]
    async fn forget_rejects_bad_id() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(Command::Forget { id: "nope".into() }, &temp_config(&dir))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::Validation(_)));
    }

    #[tokio::test]
    async fn tools_prints_both_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(Command::Tools, &temp_config(&dir)).await.unwrap();
        let defs: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(defs[0]["name"], "memory_capture");
        assert_eq!(defs[1]["name"], "memory_recall");
    }

    #[tokio::test]
    async fn config_redacts_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(&dir);
        config.memory.api_key = Some("sk-secret".into());
        let out = run(Command::Config, &config).await.unwrap();
        assert!(!out.contains("sk-secret"));
        assert!(out.contains("[REDACTED]"));
        assert!(!dir.path().join("vector.db").exists());
    }
}
