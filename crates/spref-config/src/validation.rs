// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: non-empty names and
//! paths, a single key source, well-formed hex keys, known log levels.

use crate::diagnostic::ConfigError;
use crate::model::SprefConfig;

/// Raw keys shorter than this many hex digits (16 bytes) are rejected.
const MIN_KEY_HEX_LEN: usize = 32;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &SprefConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.store.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.name must not be empty".to_string(),
        });
    }

    if config.store.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.database_path must not be empty".to_string(),
        });
    }

    let encryption = &config.encryption;
    if encryption.passphrase.is_some() && encryption.key_hex.is_some() {
        errors.push(ConfigError::Validation {
            message: "encryption.passphrase and encryption.key_hex are mutually exclusive"
                .to_string(),
        });
    }

    if let Some(passphrase) = &encryption.passphrase {
        if passphrase.is_empty() {
            errors.push(ConfigError::Validation {
                message: "encryption.passphrase must not be empty".to_string(),
            });
        }
    }

    if let Some(key_hex) = &encryption.key_hex {
        let key_hex = key_hex.trim();
        if hex::decode(key_hex).is_err() {
            errors.push(ConfigError::Validation {
                message: "encryption.key_hex is not valid hex".to_string(),
            });
        } else if key_hex.len() < MIN_KEY_HEX_LEN {
            errors.push(ConfigError::Validation {
                message: format!(
                    "encryption.key_hex must be at least {MIN_KEY_HEX_LEN} hex digits (16 bytes), got {}",
                    key_hex.len()
                ),
            });
        }
    }

    if let Some(path) = &config.defaults.path {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "defaults.path must not be empty when set".to_string(),
            });
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
