// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization checks that serde cannot express.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized config, collecting every failure.
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let memory = &config.memory;

    if memory.database_path.trim().is_empty() {
        errors.push(invalid("memory.database_path must not be empty"));
    }

    if !(memory.min_score > 0.0 && memory.min_score <= 1.0) {
        errors.push(invalid(format!(
            "memory.min_score must be in (0.0, 1.0], got {}",
            memory.min_score
        )));
    }

    if memory.max_results == 0 {
        errors.push(invalid("memory.max_results must be at least 1"));
    }

    if memory.candidate_window == 0 {
        errors.push(invalid("memory.candidate_window must be at least 1"));
    }

    if memory.embedding_model.trim().is_empty() {
        errors.push(invalid("memory.embedding_model must not be empty"));
    }

    if !memory.api_base_url.starts_with("http://") && !memory.api_base_url.starts_with("https://")
    {
        errors.push(invalid(format!(
            "memory.api_base_url must be an http(s) URL, got `{}`",
            memory.api_base_url
        )));
    }

    if config.capture.min_chars > config.capture.max_chars {
        errors.push(invalid(format!(
            "capture.min_chars ({}) exceeds capture.max_chars ({})",
            config.capture.min_chars, config.capture.max_chars
        )));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(format!(
            "logging.level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.logging.level
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MnemoConfig::default()).is_ok());
    }

    #[test]
    fn zero_min_score_rejected() {
        let mut config = MnemoConfig::default();
        config.memory.min_score = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("min_score"));
    }

    #[test]
    fn collects_every_failure() {
        let mut config = MnemoConfig::default();
        config.memory.database_path = "  ".into();
        config.memory.max_results = 0;
        config.capture.min_chars = 600;
        config.logging.level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = MnemoConfig::default();
        config.logging.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
