// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core definitions for the Mnemo long-term memory system.
//!
//! Holds the shared [`MnemoError`] taxonomy and the [`EmbeddingProvider`]
//! capability that every embedding backend implements.

pub mod error;
pub mod traits;

pub use error::MnemoError;
pub use traits::EmbeddingProvider;
