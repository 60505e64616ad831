// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value encryption for the spref settings store.
//!
//! Settings are encrypted one value at a time with AES-128-ECB under a key
//! that is either supplied raw or derived from a passphrase (SHA-1, first 128
//! bits). Ciphertext is stored as URL-safe base64. Decryption never raises:
//! failures come back as `None` or as an [`EncodedValue`] error state.

pub mod crypto;
pub mod encoded;
pub mod kdf;
pub mod key;
pub mod prompt;

pub use encoded::{EncodedValue, EncryptionState};
pub use key::{CipherKey, KeyMaterial};
pub use prompt::get_passphrase;
