// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry for exposing Mnemo operations to an agent.

pub mod tool;

pub use tool::{Tool, ToolOutput, ToolRegistry};
