// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for OpenAI-compatible `/embeddings` endpoints.

use mnemo_config::MemoryConfig;
use mnemo_core::MnemoError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::l2_normalize;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Output width of a known embedding model; unknown models are assumed 1536.
pub fn model_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Picks the configured key, falling back to the environment value.
///
/// Blank strings count as absent.
pub fn resolve_api_key(configured: Option<&str>, env: Option<String>) -> Result<String, MnemoError> {
    configured
        .map(str::to_string)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env.filter(|k| !k.trim().is_empty()))
        .ok_or_else(|| {
            MnemoError::Config(format!(
                "remote embedding provider needs memory.api_key or {API_KEY_ENV}"
            ))
        })
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeds text by calling a remote API.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    dims: usize,
}

impl RemoteEmbedder {
    /// Creates a client for `{base_url}/embeddings`.
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, MnemoError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MnemoError::Embedding {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        let dims = model_dimensions(&model);
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
            dims,
        })
    }

    pub fn from_config(config: &MemoryConfig) -> Result<Self, MnemoError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())?;
        Self::new(api_key, config.embedding_model.clone(), &config.api_base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Requests one embedding and normalizes it.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MnemoError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| MnemoError::Embedding {
                message: format!("request to {} failed: {e}", self.endpoint),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, chars = text.len(), "embedding response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemoError::embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| MnemoError::Embedding {
            message: format!("invalid embedding response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| MnemoError::embedding("no embedding returned"))?;

        if vector.len() != self.dims {
            return Err(MnemoError::embedding(format!(
                "model {} returned {} dimensions, expected {}",
                self.model,
                vector.len(),
                self.dims
            )));
        }

        Ok(l2_normalize(vector))
    }
}
