// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types and vector helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};

/// Semantic category of a memory.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MemoryCategory {
    /// Likes, dislikes, wants.
    Preference,
    /// Choices that were made.
    Decision,
    /// Named things: people, phone numbers, addresses.
    Entity,
    /// General statements about the world or the user.
    Fact,
    #[default]
    Other,
}

impl MemoryCategory {
    /// Maps an exact lowercase category name to its variant. Anything else,
    /// including other casings, is [`MemoryCategory::Other`].
    ///
    /// Used on write. Search filters go through the case-insensitive
    /// `FromStr` instead.
    pub fn coerce(name: &str) -> Self {
        if Self::VARIANTS.contains(&name) {
            name.parse().unwrap_or_default()
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// A persisted memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Lowercase UUIDv4, assigned at creation.
    pub id: String,
    /// The remembered text.
    pub text: String,
    /// Unit-length embedding of `text`.
    #[serde(skip)]
    pub vector: Vec<f32>,
    /// Advisory weight in [0, 1].
    pub importance: f32,
    pub category: MemoryCategory,
    /// Conversation the memory came from, if any.
    pub session_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A memory paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySearchResult {
    pub entry: MemoryEntry,
    /// Dot product of the query and entry vectors, in [-1, 1].
    pub score: f32,
}

/// Encodes a vector as little-endian f32 bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decodes little-endian f32 bytes. Trailing bytes that do not form a
/// whole float are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity of two unit-length vectors (their dot product).
///
/// Returns `None` when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean length of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
