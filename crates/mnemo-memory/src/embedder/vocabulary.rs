// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Term-frequency vectors over a fixed built-in vocabulary.
//!
//! Needs no network, no model file, and no subprocess. Quality is limited to
//! word overlap on the vocabulary below, which favors general English and
//! software vocabulary.

use std::collections::HashMap;

use super::l2_normalize;

/// Bumped whenever [`VOCABULARY`] changes, since indices shift.
pub const VOCABULARY_VERSION: &str = "v1";

/// Built-in vocabulary. A word's first occurrence fixes its index.
pub const VOCABULARY: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i",
    "it", "for", "not", "on", "with", "he", "as", "you", "do", "at",
    "this", "but", "his", "by", "from", "they", "we", "say", "her", "she",
    "or", "an", "will", "my", "one", "all", "would", "there", "their", "what",
    "so", "up", "out", "if", "about", "who", "get", "which", "go", "me",
    "when", "make", "can", "like", "time", "no", "just", "him", "know", "take",
    "people", "into", "year", "your", "good", "some", "could", "them", "see", "other",
    "than", "then", "now", "look", "only", "come", "its", "over", "think", "also",
    "back", "after", "use", "two", "how", "our", "work", "first", "well", "way",
    "even", "new", "want", "because", "any", "these", "give", "day", "most", "us",
    "is", "was", "are", "were", "been", "has", "had", "did", "does", "doing",
    "code", "function", "class", "method", "variable", "program", "software", "computer",
    "data", "file", "project", "build", "test", "run", "debug", "error", "fix",
    "create", "add", "remove", "delete", "update", "change", "modify", "edit",
    "install", "configure", "setup", "deploy", "server", "client", "api", "web",
    "database", "query", "table", "column", "row", "sql", "nosql", "json", "xml",
    "python", "javascript", "typescript", "go", "golang", "rust", "java", "cpp", "c++",
    "react", "vue", "angular", "node", "express", "django", "flask", "fastapi",
    "docker", "kubernetes", "container", "cloud", "aws", "azure", "gcp",
    "git", "github", "commit", "branch", "merge", "pull", "push", "repository",
    "memory", "remember", "recall", "search", "find", "store", "save", "load",
    "user", "preference", "like", "dislike", "want", "need", "important", "always",
    "never", "usually", "sometimes", "often", "rarely", "name", "email", "phone",
    "address", "location", "place", "city", "country", "company", "work", "job",
];

/// Embeds text as normalized term frequencies over [`VOCABULARY`].
#[derive(Debug, Clone)]
pub struct VocabularyEmbedder {
    index: HashMap<&'static str, usize>,
}

impl VocabularyEmbedder {
    pub fn new() -> Self {
        let mut index = HashMap::with_capacity(VOCABULARY.len());
        for word in VOCABULARY {
            let next = index.len();
            index.entry(*word).or_insert(next);
        }
        Self { index }
    }

    pub fn dimensions(&self) -> usize {
        self.index.len()
    }

    /// Splits on whitespace, strips non `a-z` characters from each token's
    /// ends, and weights each known word by `count / total tokens`.
    ///
    /// Texts with no vocabulary word yield a zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let mut vector = vec![0.0_f32; self.dimensions()];
        if tokens.is_empty() {
            return vector;
        }

        let total = tokens.len() as f32;
        for token in &tokens {
            let word = token.trim_matches(|c: char| !c.is_ascii_lowercase());
            if let Some(&idx) = self.index.get(word) {
                vector[idx] += 1.0 / total;
            }
        }
        l2_normalize(vector)
    }
}

impl Default for VocabularyEmbedder {
    fn default() -> Self {
        Self::new()
    }
}
