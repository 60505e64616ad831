// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key material accepted from callers and the resolved cipher key.

use secrecy::{ExposeSecret, SecretString};
use spref_core::SprefError;
use zeroize::Zeroizing;

use crate::kdf::{self, KEY_LEN};

/// How the caller supplies the encryption key.
pub enum KeyMaterial {
    /// Raw key bytes. At least 16 bytes; only the first 16 are used.
    Raw(Zeroizing<Vec<u8>>),
    /// A passphrase routed through [`kdf::derive_key`].
    Passphrase(SecretString),
}

impl KeyMaterial {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        KeyMaterial::Raw(Zeroizing::new(bytes.into()))
    }

    pub fn passphrase(passphrase: impl Into<String>) -> Self {
        KeyMaterial::Passphrase(SecretString::from(passphrase.into()))
    }

    /// Parse a hex-encoded raw key.
    pub fn from_hex(encoded: &str) -> Result<Self, SprefError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| SprefError::Encryption(format!("key is not valid hex: {e}")))?;
        Ok(KeyMaterial::raw(bytes))
    }

    /// Resolve to the 16-byte key used by the cipher.
    pub fn resolve(&self) -> Result<CipherKey, SprefError> {
        match self {
            KeyMaterial::Raw(bytes) => CipherKey::from_slice(bytes),
            KeyMaterial::Passphrase(passphrase) => {
                Ok(CipherKey(kdf::derive_key(passphrase.expose_secret())))
            }
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMaterial::Raw(bytes) => f
                .debug_tuple("Raw")
                .field(&format_args!("[REDACTED; {} bytes]", bytes.len()))
                .finish(),
            KeyMaterial::Passphrase(_) => f.debug_tuple("Passphrase").field(&"[REDACTED]").finish(),
        }
    }
}

/// A resolved AES-128 key. Zeroed on drop; never printed.
#[derive(Clone)]
pub struct CipherKey(Zeroizing<[u8; KEY_LEN]>);

impl CipherKey {
    /// Take the first 16 bytes of `bytes` as the key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SprefError> {
        if bytes.len() < KEY_LEN {
            return Err(SprefError::Encryption(format!(
                "raw key must be at least {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&bytes[..KEY_LEN]);
        Ok(Self(key))
    }

    pub fn from_passphrase(passphrase: &str) -> Self {
        Self(kdf::derive_key(passphrase))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}
