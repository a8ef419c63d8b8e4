// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as known log levels, non-zero deadlines, and well-formed associations.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::StratoConfig;

/// Log levels accepted by `host.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StratoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.host.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "host.name must not be empty".to_string(),
        });
    }

    let level = config.host.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "host.log_level `{}` is not one of {}",
                config.host.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.lifecycle.stop_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "lifecycle.stop_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.lifecycle.filter_start_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "lifecycle.filter_start_timeout_secs must be at least 1".to_string(),
        });
    }

    let mut seen_pairs = HashSet::new();
    for (i, assoc) in config.associations.iter().enumerate() {
        if assoc.filter.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("associations[{i}].filter must not be empty"),
            });
        }
        if assoc.storage.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("associations[{i}].storage must not be empty"),
            });
        }
        if !seen_pairs.insert((&assoc.filter, &assoc.storage)) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate association `{}` -> `{}` in [[associations]] array",
                    assoc.filter, assoc.storage
                ),
            });
        }
    }

    for name in config.plugins.keys() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "plugins table contains an empty plugin name".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssociationConfig;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = StratoConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = StratoConfig::default();
        config.host.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "host.log_level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = StratoConfig::default();
        config.host.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_stop_timeout_fails_validation() {
        let mut config = StratoConfig::default();
        config.lifecycle.stop_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "stop_timeout_secs"));
    }

    #[test]
    fn duplicate_association_fails_validation() {
        let mut config = StratoConfig::default();
        let assoc = AssociationConfig {
            filter: "by-email".to_string(),
            storage: "users-db".to_string(),
        };
        config.associations = vec![assoc.clone(), assoc];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate association"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = StratoConfig::default();
        config.host.name = " ".to_string();
        config.lifecycle.filter_start_timeout_secs = 0;
        config.associations = vec![AssociationConfig {
            filter: String::new(),
            storage: "users-db".to_string(),
        }];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
