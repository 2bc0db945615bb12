// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding backends.
//!
//! [`Embedder`] is the closed set of strategies a store can be built with.
//! It is chosen once from [`MemoryConfig::embedding_provider`] and never
//! swapped afterwards. Every backend returns unit-length vectors, or an
//! all-zero vector when the text carries no usable signal.

pub mod local;
pub mod remote;
pub mod vocabulary;

use async_trait::async_trait;
use mnemo_config::{EmbeddingProviderKind, MemoryConfig};
use mnemo_core::{EmbeddingProvider, MnemoError};

pub use local::LocalEmbedder;
pub use remote::RemoteEmbedder;
pub use vocabulary::VocabularyEmbedder;

/// One of the supported embedding strategies.
#[derive(Debug)]
pub enum Embedder {
    /// OpenAI-compatible HTTP endpoint.
    Remote(RemoteEmbedder),
    /// Local model file, via a companion script or the n-gram hash fallback.
    Local(LocalEmbedder),
    /// Built-in vocabulary term frequencies.
    Vocabulary(VocabularyEmbedder),
}

impl Embedder {
    /// Builds the embedder selected by `config`.
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MnemoError> {
        let embedder = match config.embedding_provider {
            EmbeddingProviderKind::OpenAi => Embedder::Remote(RemoteEmbedder::from_config(config)?),
            EmbeddingProviderKind::Local => Embedder::Local(LocalEmbedder::from_config(config)?),
            EmbeddingProviderKind::Vocabulary => Embedder::Vocabulary(VocabularyEmbedder::new()),
        };
        tracing::debug!(
            provider = %config.embedding_provider,
            identity = %embedder.identity(),
            dimensions = embedder.dimensions(),
            "embedder ready"
        );
        Ok(embedder)
    }

    /// Stable name of the vector space this embedder produces.
    ///
    /// Two embedders with the same identity and dimensions produce
    /// comparable vectors.
    pub fn identity(&self) -> String {
        match self {
            Embedder::Remote(e) => format!("openai:{}", e.model()),
            Embedder::Local(e) => e.identity(),
            Embedder::Vocabulary(_) => format!("vocabulary:{}", vocabulary::VOCABULARY_VERSION),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MnemoError> {
        match self {
            Embedder::Remote(e) => e.embed(text).await,
            Embedder::Local(e) => e.embed(text).await,
            Embedder::Vocabulary(e) => Ok(e.embed(text)),
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            Embedder::Remote(e) => e.dimensions(),
            Embedder::Local(e) => e.dimensions(),
            Embedder::Vocabulary(e) => e.dimensions(),
        }
    }
}

/// Scales `v` to unit length. A zero vector is returned unchanged.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = crate::types::l2_norm(&v);
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::l2_norm;

    #[test]
    fn normalize_scales_to_unit_length() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector() {
        assert_eq!(l2_normalize(vec![0.0; 4]), vec![0.0; 4]);
    }

    #[tokio::test]
    async fn default_config_builds_vocabulary_embedder() {
        let embedder = Embedder::from_config(&MemoryConfig::default()).unwrap();
        assert!(matches!(embedder, Embedder::Vocabulary(_)));
        assert!(embedder.identity().starts_with("vocabulary:"));

        let v = embedder.embed("remember the user likes rust").await.unwrap();
        assert_eq!(v.len(), embedder.dimensions());
        assert!((l2_norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn local_without_model_is_config_error() {
        let config = MemoryConfig {
            embedding_provider: EmbeddingProviderKind::Local,
            local_model_path: Some("/nonexistent/mnemo/model.gguf".into()),
            ..MemoryConfig::default()
        };
        let err = Embedder::from_config(&config).unwrap_err();
        assert!(matches!(err, MnemoError::Config(_)));
    }

    #[test]
    fn remote_identity_names_model() {
        let config = MemoryConfig {
            embedding_provider: EmbeddingProviderKind::OpenAi,
            api_key: Some("sk-test".into()),
            embedding_model: "text-embedding-3-large".into(),
            ..MemoryConfig::default()
        };
        let embedder = Embedder::from_config(&config).unwrap();
        assert_eq!(embedder.identity(), "openai:text-embedding-3-large");
        assert_eq!(embedder.dimensions(), 3072);
    }
}
