// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding capability: text in, unit-length vector out.

use async_trait::async_trait;

use crate::error::MnemoError;

/// Turns text into a fixed-length, L2-normalized vector.
///
/// Every implementation returns vectors of exactly [`dimensions`](Self::dimensions)
/// components with unit L2 norm, so callers can use a plain dot product as
/// cosine similarity. A text carrying no signal for the provider may come
/// back as the all-zero vector; callers that persist vectors must reject it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MnemoError>;

    /// Length of every vector this provider produces.
    fn dimensions(&self) -> usize;
}
