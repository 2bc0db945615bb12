// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Mnemo crate.

use thiserror::Error;

/// The error type returned by embedding providers, the memory store, and tools.
///
/// Nothing in Mnemo retries internally: every variant is handed back to the
/// immediate caller, which decides how to surface it.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Provider setup is missing or invalid (no API key, no model file,
    /// store reopened with a different embedder).
    #[error("configuration error: {0}")]
    Config(String),

    /// Turning text into a vector failed (network, subprocess, parse).
    #[error("embedding failed: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backing SQLite file could not be opened, read, or written.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller input was rejected before any work was done.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Shorthand for an [`MnemoError::Embedding`] without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        MnemoError::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any storage-layer error into [`MnemoError::Storage`].
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MnemoError::Storage {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        assert_eq!(
            MnemoError::Config("no api key".into()).to_string(),
            "configuration error: no api key"
        );
        assert_eq!(
            MnemoError::embedding("status 500").to_string(),
            "embedding failed: status 500"
        );
        assert_eq!(
            MnemoError::Validation("bad id".into()).to_string(),
            "validation error: bad id"
        );
        assert_eq!(
            MnemoError::NotFound("memory abc".into()).to_string(),
            "not found: memory abc"
        );
    }

    #[test]
    fn storage_wraps_source() {
        let err = MnemoError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
