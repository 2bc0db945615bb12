// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local model embeddings.
//!
//! When an `embed.py` script sits next to the model file it is run as
//! `python3 embed.py <model> <text>` and must print a JSON array of numbers.
//! Without the script, a deterministic character 3-gram hash histogram is
//! used instead.

use std::path::{Path, PathBuf};

use mnemo_config::MemoryConfig;
use mnemo_core::MnemoError;
use tokio::process::Command;
use tracing::debug;

use super::l2_normalize;

/// Companion script looked up beside the model file.
pub const SCRIPT_NAME: &str = "embed.py";

/// File names probed in the default model directory, in order.
pub const DEFAULT_MODEL_FILES: [&str; 2] = ["all-MiniLM-L6-v2.gguf", "model.gguf"];

const SMALL_DIMENSIONS: usize = 384;
const LARGE_DIMENSIONS: usize = 768;

/// `~/.mnemo/models/embeddings`
pub fn default_model_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mnemo").join("models").join("embeddings"))
}

/// First default model file that exists.
pub fn find_default_model() -> Option<PathBuf> {
    let dir = default_model_dir()?;
    DEFAULT_MODEL_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Embeds text with a model stored on disk.
#[derive(Debug, Clone)]
pub struct LocalEmbedder {
    model_path: PathBuf,
    script: Option<PathBuf>,
    dims: usize,
}

impl LocalEmbedder {
    /// Uses the model at `model_path`, which must exist.
    pub fn new(model_path: impl Into<PathBuf>) -> Result<Self, MnemoError> {
        let model_path = model_path.into();
        if !model_path.is_file() {
            return Err(MnemoError::Config(format!(
                "local embedding model not found: {}",
                model_path.display()
            )));
        }

        let dims = if model_path.to_string_lossy().contains("large") {
            LARGE_DIMENSIONS
        } else {
            SMALL_DIMENSIONS
        };

        let script = model_path
            .parent()
            .map(|dir| dir.join(SCRIPT_NAME))
            .filter(|p| p.is_file());

        debug!(
            model = %model_path.display(),
            dims,
            script = script.is_some(),
            "local embedder configured"
        );

        Ok(Self {
            model_path,
            script,
            dims,
        })
    }

    /// Uses `memory.local_model_path`, or the first default model found.
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MnemoError> {
        let path = match &config.local_model_path {
            Some(p) => PathBuf::from(p),
            None => find_default_model().ok_or_else(|| {
                MnemoError::Config(format!(
                    "no local embedding model found; set memory.local_model_path or place one of {} in {}",
                    DEFAULT_MODEL_FILES.join(", "),
                    default_model_dir()
                        .map(|d| d.display().to_string())
                        .unwrap_or_else(|| "~/.mnemo/models/embeddings".to_string())
                ))
            })?,
        };
        Self::new(path)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Whether embeddings come from the companion script.
    pub fn uses_script(&self) -> bool {
        self.script.is_some()
    }

    /// Script and hash embeddings live in different vector spaces, so
    /// they get different identities.
    pub(crate) fn identity(&self) -> String {
        let file = self
            .model_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.script {
            Some(_) => format!("local:script:{file}"),
            None => format!("local:ngram:{}", self.dims),
        }
    }

    /// Runs the companion script when one was found at construction, else
    /// falls back to n-gram hashing. A script added after the embedder is
    /// built is ignored until the store is reopened.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MnemoError> {
        match &self.script {
            Some(script) => self.embed_with_script(script, text).await,
            None => Ok(ngram_hash_embedding(text, self.dims)),
        }
    }

    async fn embed_with_script(&self, script: &Path, text: &str) -> Result<Vec<f32>, MnemoError> {
        let output = Command::new("python3")
            .arg(script)
            .arg(&self.model_path)
            .arg(text)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MnemoError::Embedding {
                message: format!("failed to run {}: {e}", script.display()),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MnemoError::embedding(format!(
                "{} exited with {}: {}",
                SCRIPT_NAME,
                output.status,
                stderr.trim()
            )));
        }

        let vector: Vec<f32> =
            serde_json::from_slice(&output.stdout).map_err(|e| MnemoError::Embedding {
                message: format!("{SCRIPT_NAME} printed invalid JSON: {e}"),
                source: Some(Box::new(e)),
            })?;

        if vector.len() != self.dims {
            return Err(MnemoError::embedding(format!(
                "{SCRIPT_NAME} returned {} dimensions, expected {}",
                vector.len(),
                self.dims
            )));
        }

        Ok(l2_normalize(vector))
    }
}

/// Histogram of hashed lowercase character trigrams, normalized.
///
/// Each trigram is hashed with djb2 (seed 5381, `h * 33 + c`, wrapping) and
/// counted in bucket `h % dims`. Texts shorter than three characters yield
/// a zero vector.
pub fn ngram_hash_embedding(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0_f32; dims];
    if dims == 0 {
        return vector;
    }
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    for gram in chars.windows(3) {
        let hash = gram.iter().fold(5381_u64, |h, &c| {
            h.wrapping_shl(5).wrapping_add(h).wrapping_add(u64::from(c))
        });
        vector[(hash % dims as u64) as usize] += 1.0;
    }
    l2_normalize(vector)
}
