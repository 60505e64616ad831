// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encryption tag keys.
//!
//! Whether a setting is stored encrypted is recorded in a boolean entry next to
//! it, keyed by [`ENCRYPTION_TAG_PREFIX`] followed by the setting's key.

/// Reserved key prefix for encryption tags. User keys must not start with it.
pub const ENCRYPTION_TAG_PREFIX: &str = "__spref_encrypted__.";

/// The tag key recording the encryption state of `key`.
pub fn tag_key(key: &str) -> String {
    format!("{ENCRYPTION_TAG_PREFIX}{key}")
}

pub fn is_tag_key(key: &str) -> bool {
    key.starts_with(ENCRYPTION_TAG_PREFIX)
}
