// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Mnemo.
//!
//! Loads TOML files and `MNEMO_*` environment variables through Figment,
//! rejects unknown keys, and reports problems as miette diagnostics.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use model::{CaptureConfig, EmbeddingProviderKind, LoggingConfig, MemoryConfig, MnemoConfig};

/// Loads from the standard hierarchy and validates the result.
pub fn load_and_validate() -> Result<MnemoConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Loads one explicit file (plus env overrides) and validates the result.
pub fn load_and_validate_path(path: &Path) -> Result<MnemoConfig, Vec<ConfigError>> {
    if !path.exists() {
        return Err(vec![ConfigError::Other(format!(
            "config file not found: {}",
            path.display()
        ))]);
    }
    finish(loader::load_config_from_path(path))
}

/// Parses an inline TOML string and validates the result.
pub fn load_and_validate_str(toml_content: &str) -> Result<MnemoConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

fn finish(loaded: Result<MnemoConfig, figment::Error>) -> Result<MnemoConfig, Vec<ConfigError>> {
    let config = loaded.map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Serializes an effective configuration back to TOML for display.
pub fn render_toml(config: &MnemoConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::Other(e.to_string()))
}
