// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for spref.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level spref configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SprefConfig {
    /// Backing store location and namespace.
    #[serde(default)]
    pub store: StoreConfig,

    /// Value encryption key source.
    #[serde(default)]
    pub encryption: EncryptionConfig,

    /// Declarative defaults document and merge policy.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backing store configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Namespace of the settings collection inside the database.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_store_name() -> String {
    "default".to_string()
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("spref/spref.db").display().to_string())
        .unwrap_or_else(|| "spref.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Encryption key source. At most one of the two may be set.
#[derive(Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptionConfig {
    /// Passphrase hashed into the AES key.
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Raw key as hex (at least 16 bytes).
    #[serde(default)]
    pub key_hex: Option<String>,
}

impl EncryptionConfig {
    pub fn is_configured(&self) -> bool {
        self.passphrase.is_some() || self.key_hex.is_some()
    }
}

impl std::fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("key_hex", &self.key_hex.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// When the defaults document is merged into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeWhen {
    /// Every time the store is opened.
    #[default]
    Always,
    /// Only when the store holds no settings yet.
    IfEmpty,
}

/// Defaults document configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// XML defaults document merged on open. No merge when unset.
    #[serde(default)]
    pub path: Option<String>,

    /// Overwrite existing keys with document values.
    #[serde(default)]
    pub should_override: bool,

    #[serde(default)]
    pub merge_when: MergeWhen,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
