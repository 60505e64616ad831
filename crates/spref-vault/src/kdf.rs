// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-to-key derivation.
//!
//! The key is the first 128 bits of SHA-1 over the UTF-8 passphrase. There is
//! no salt and no iteration count: this is a convenience mapping from a
//! memorable string to a fixed key, not password hardening. Changing it would
//! orphan every value already encrypted under the old derivation.

use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

/// Length in bytes of every AES-128 key used by the store.
pub const KEY_LEN: usize = 16;

/// Derive a 16-byte key from a passphrase.
///
/// Deterministic: the same passphrase always yields the same key, so values
/// written in one process stay readable in the next.
pub fn derive_key(passphrase: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let digest = Sha1::digest(passphrase.as_bytes());
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}
