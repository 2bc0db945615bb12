// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term semantic memory.
//!
//! Short texts are embedded with one of the [`Embedder`] backends and kept
//! in a single SQLite file by [`MemoryStore`]. Search scores a recent window
//! of memories by cosine similarity. [`AutoCapture`] decides which
//! conversation text is worth keeping, [`MemoryContext`] wires recall and
//! capture around a turn, and the tools in [`tool`] expose both to an agent.

pub mod capture;
pub mod context;
pub mod embedder;
pub mod store;
pub mod tool;
pub mod types;

pub use capture::{AutoCapture, CaptureRules, MEMORY_CONTEXT_MARKER};
pub use context::MemoryContext;
pub use embedder::{Embedder, LocalEmbedder, RemoteEmbedder, VocabularyEmbedder};
pub use store::MemoryStore;
pub use tool::{CaptureTool, RecallTool, register_memory_tools};
pub use types::{MemoryCategory, MemoryEntry, MemorySearchResult};
