// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/mnemo/mnemo.toml`,
//! `~/.config/mnemo/mnemo.toml`, `./mnemo.toml`, then `MNEMO_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemoConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mnemo/mnemo.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "mnemo.toml";

/// Returns the per-user configuration file path, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mnemo").join(LOCAL_CONFIG_FILE))
}

/// Builds the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Loads configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<MnemoConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from one explicit file plus env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from an inline TOML string (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Maps `MNEMO_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `MNEMO_MEMORY_API_KEY` maps to `memory.api_key`, not `memory.api.key`.
fn env_provider() -> Env {
    Env::prefixed("MNEMO_").map(|key| {
        // Keys arrive with their original case.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = ["memory", "capture", "logging"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmbeddingProviderKind;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MNEMO_MEMORY_API_KEY", "sk-test");
            jail.set_env("MNEMO_MEMORY_EMBEDDING_PROVIDER", "openai");
            jail.set_env("MNEMO_CAPTURE_MAX_EMOJI", "5");
            jail.set_env("MNEMO_LOGGING_LEVEL", "debug");

            let config = load_config().expect("env-only config should load");
            assert_eq!(config.memory.api_key.as_deref(), Some("sk-test"));
            assert_eq!(
                config.memory.embedding_provider,
                EmbeddingProviderKind::OpenAi
            );
            assert_eq!(config.capture.max_emoji, 5);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn single_env_key_leaves_other_sections_default() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[capture]\nmin_chars = 4\n")?;
            jail.set_env("MNEMO_MEMORY_API_KEY", "sk-only");

            let config = load_config_from_path(Path::new("custom.toml"))
                .expect("env key should map onto memory.api_key");
            assert_eq!(config.memory.api_key.as_deref(), Some("sk-only"));
            assert_eq!(config.memory.max_results, 5);
            assert_eq!(config.capture.min_chars, 4);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [memory]
                max_results = 9
                "#,
            )?;
            let config = load_config().expect("local file should load");
            assert_eq!(config.memory.max_results, 9);
            assert_eq!(config.memory.candidate_window, 1000);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[memory]\nmin_score = 0.25\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))
                .expect("explicit file should load");
            assert!((config.memory.min_score - 0.25).abs() < f32::EPSILON);
            Ok(())
        });
    }
}
