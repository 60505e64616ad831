// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the spref settings store.

use thiserror::Error;

/// The primary error type used across all spref crates.
///
/// Cryptographic failures never appear here: on the read path they surface as
/// `None` or as a decryption state on the returned value.
#[derive(Debug, Error)]
pub enum SprefError {
    /// Configuration errors (invalid TOML, bad key material, missing store name).
    #[error("configuration error: {0}")]
    Config(String),

    /// The settings handle was used before a store was configured.
    #[error("settings store has not been configured")]
    NotConfigured,

    /// Persistent engine errors (database open, query failure, lock poisoning).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Encryption setup errors (unusable key material). Never raised for
    /// individual encrypt/decrypt failures.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Defaults document errors (missing source, malformed XML, I/O).
    #[error("defaults document error: {0}")]
    Defaults(String),

    /// Value (de)serialization errors for JSON-backed entries.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SprefError {
    /// Wrap any error as a [`SprefError::Storage`].
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SprefError::Storage { source: err.into() }
    }
}
