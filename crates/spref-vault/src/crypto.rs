// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-128-ECB encrypt/decrypt of single string values, plus the
//! base64 transport form used at rest.
//!
//! ECB is deterministic: equal plaintext blocks under one key produce equal
//! ciphertext blocks. Only short scalar settings go through here.
//!
//! Every failure (wrong key length, bad padding, truncated ciphertext,
//! non-UTF-8 plaintext) is reported as `None`, never as an error.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};

type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;
type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Encrypt a string with AES-128-ECB and PKCS#7 padding.
///
/// Returns `None` if `key` is not exactly 16 bytes.
pub fn encrypt(key: &[u8], plaintext: &str) -> Option<Vec<u8>> {
    let cipher = Aes128EcbEnc::new_from_slice(key).ok()?;
    Some(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()))
}

/// Decrypt AES-128-ECB ciphertext produced by [`encrypt`].
///
/// Returns `None` for a wrong key length, a ciphertext that is empty or not a
/// whole number of blocks, invalid padding, or a plaintext that is not UTF-8.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Option<String> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return None;
    }
    let cipher = Aes128EcbDec::new_from_slice(key).ok()?;
    let plaintext = cipher.decrypt_padded_vec_mut::<Pkcs7>(ciphertext).ok()?;
    String::from_utf8(plaintext).ok()
}

/// Encode ciphertext for storage: URL-safe alphabet, padded, single line.
pub fn encode_ciphertext(ciphertext: &[u8]) -> String {
    URL_SAFE.encode(ciphertext)
}

/// Decode stored ciphertext.
///
/// Line breaks and other whitespace are ignored. The URL-safe alphabet is
/// tried first; the standard alphabet is accepted too so values written by
/// the legacy single-line standard-base64 format still decode.
pub fn decode_ciphertext(encoded: &str) -> Option<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    [&URL_SAFE, &URL_SAFE_NO_PAD, &STANDARD, &STANDARD_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(&compact).ok())
}

/// Encrypt and encode in one step. `None` on any failure.
pub fn seal_to_text(key: &[u8], plaintext: &str) -> Option<String> {
    encrypt(key, plaintext).map(|ct| encode_ciphertext(&ct))
}

/// Decode and decrypt in one step. `None` on any failure.
pub fn open_from_text(key: &[u8], encoded: &str) -> Option<String> {
    decrypt(key, &decode_ciphertext(encoded)?)
}
