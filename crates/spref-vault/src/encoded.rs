// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome of reading a possibly-encrypted setting.

use strum::Display;

/// What happened when a setting was read through the safe encrypted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EncryptionState {
    /// The key was not tagged as encrypted; the raw value is returned as-is.
    Success,
    /// The key was tagged as encrypted and decrypted cleanly.
    SuccessfullyDecrypted,
    /// Ciphertext was present but could not be decoded or decrypted.
    DecryptionError,
    /// The key is tagged as encrypted but no cipher key is configured, or the
    /// ciphertext itself is missing.
    InternalError,
}

impl EncryptionState {
    /// True for the two states that carry a usable value.
    pub fn is_success(self) -> bool {
        matches!(self, EncryptionState::Success | EncryptionState::SuccessfullyDecrypted)
    }
}

/// A read result paired with how it was obtained.
///
/// `value` is only ever `Some` for the success states; callers must inspect
/// [`EncodedValue::state`] to tell "no value" from "undecryptable value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    state: EncryptionState,
    value: Option<String>,
}

impl EncodedValue {
    /// An unencrypted pass-through read. `value` is `None` if the key is absent.
    pub fn plain(value: Option<String>) -> Self {
        Self {
            state: EncryptionState::Success,
            value,
        }
    }

    pub fn decrypted(value: String) -> Self {
        Self {
            state: EncryptionState::SuccessfullyDecrypted,
            value: Some(value),
        }
    }

    pub fn decryption_error() -> Self {
        Self {
            state: EncryptionState::DecryptionError,
            value: None,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            state: EncryptionState::InternalError,
            value: None,
        }
    }

    pub fn state(&self) -> EncryptionState {
        self.state
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }
}
