// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The typed settings store.
//!
//! [`SettingsStore`] wraps one [`PreferenceBackend`] namespace and an optional
//! cipher key. Reads never fail: backend errors are logged and degrade to the
//! default. Writes return `Result` so engine failures stay observable, but
//! they never fail because of encryption.
//!
//! Keys starting with [`ENCRYPTION_TAG_PREFIX`] are reserved: reads of them
//! miss and writes or removals are rejected with [`SprefError::Config`].

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use spref_core::{
    EditBatch, PrefValue, PreferenceBackend, SprefError, INVALID_FLOAT, INVALID_INT, INVALID_LONG,
};
use spref_vault::{crypto, CipherKey, EncodedValue};
use tracing::{debug, warn};

use crate::tags::{is_tag_key, tag_key, ENCRYPTION_TAG_PREFIX};

/// Typed accessor over a preference namespace with per-key encryption tags.
pub struct SettingsStore {
    backend: Box<dyn PreferenceBackend>,
    cipher_key: Option<CipherKey>,
}

impl SettingsStore {
    pub fn new(backend: Box<dyn PreferenceBackend>, cipher_key: Option<CipherKey>) -> Self {
        Self {
            backend,
            cipher_key,
        }
    }

    /// The namespace this store reads and writes.
    pub fn name(&self) -> &str {
        self.backend.namespace()
    }

    /// True if values can be encrypted and decrypted.
    pub fn has_cipher_key(&self) -> bool {
        self.cipher_key.is_some()
    }

    // --- reads ---------------------------------------------------------

    /// The stored value in whatever kind it was written.
    pub fn get_value(&self, key: &str) -> Option<PrefValue> {
        self.read(key, None, |backend| backend.get(key))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.read(key, None, |backend| backend.get_string(key, None))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    /// The stored integer, or [`INVALID_INT`] if absent.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_int_or(key, INVALID_INT)
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> i32 {
        self.read(key, default, |backend| backend.get_int(key, default))
    }

    /// The stored long, or [`INVALID_LONG`] if absent.
    pub fn get_long(&self, key: &str) -> i64 {
        self.get_long_or(key, INVALID_LONG)
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> i64 {
        self.read(key, default, |backend| backend.get_long(key, default))
    }

    /// The stored float, or [`INVALID_FLOAT`] if absent.
    pub fn get_float(&self, key: &str) -> f32 {
        self.get_float_or(key, INVALID_FLOAT)
    }

    pub fn get_float_or(&self, key: &str, default: f32) -> f32 {
        self.read(key, default, |backend| backend.get_float(key, default))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.read(key, default, |backend| backend.get_bool(key, default))
    }

    pub fn get_string_set(&self, key: &str) -> Option<BTreeSet<String>> {
        self.get_value(key).and_then(|value| match value {
            PrefValue::StringSet(set) => Some(set),
            other => {
                debug!(key = %key, stored = %other.kind(), "kind mismatch on read -- returning default");
                None
            }
        })
    }

    /// Deserialize a JSON array stored as a string.
    ///
    /// `None` if the key is absent or the stored text is not a valid array of `T`.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let text = self.get_string(key)?;
        match serde_json::from_str(&text) {
            Ok(list) => Some(list),
            Err(e) => {
                debug!(key = %key, error = %e, "stored value is not a JSON list");
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read(key, false, |backend| backend.contains(key))
    }

    /// True if the namespace holds no settings.
    pub fn is_empty(&self) -> bool {
        match self.backend.is_empty() {
            Ok(empty) => empty,
            Err(e) => {
                warn!(namespace = %self.name(), error = %e, "backend emptiness check failed");
                true
            }
        }
    }

    /// Every user setting in the namespace. Encryption tags are excluded.
    pub fn entries(&self) -> BTreeMap<String, PrefValue> {
        match self.backend.get_all() {
            Ok(mut all) => {
                all.retain(|key, _| !is_tag_key(key));
                all
            }
            Err(e) => {
                warn!(namespace = %self.name(), error = %e, "backend listing failed");
                BTreeMap::new()
            }
        }
    }

    // --- writes --------------------------------------------------------

    /// Store a value of any kind.
    pub fn save_value(&self, key: &str, value: PrefValue) -> Result<(), SprefError> {
        self.save_plain(key, Some(value))
    }

    /// Store a string. `None` removes the key.
    pub fn save_string(&self, key: &str, value: Option<&str>) -> Result<(), SprefError> {
        self.save_plain(key, value.map(PrefValue::from))
    }

    pub fn save_int(&self, key: &str, value: Option<i32>) -> Result<(), SprefError> {
        self.save_plain(key, value.map(PrefValue::Int))
    }

    pub fn save_long(&self, key: &str, value: Option<i64>) -> Result<(), SprefError> {
        self.save_plain(key, value.map(PrefValue::Long))
    }

    pub fn save_float(&self, key: &str, value: Option<f32>) -> Result<(), SprefError> {
        self.save_plain(key, value.map(PrefValue::Float))
    }

    pub fn save_bool(&self, key: &str, value: bool) -> Result<(), SprefError> {
        self.save_plain(key, Some(PrefValue::Bool(value)))
    }

    pub fn save_string_set(
        &self,
        key: &str,
        value: Option<&BTreeSet<String>>,
    ) -> Result<(), SprefError> {
        self.save_plain(key, value.map(|set| PrefValue::StringSet(set.clone())))
    }

    /// Store `items` as a JSON array string.
    pub fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), SprefError> {
        let text = serde_json::to_string(items)
            .map_err(|e| SprefError::Serialization(format!("cannot encode list `{key}`: {e}")))?;
        self.save_plain(key, Some(PrefValue::String(text)))
    }

    /// Like [`save_string`](Self::save_string), but `None` leaves the store untouched.
    pub fn save_non_null_string(&self, key: &str, value: Option<&str>) -> Result<(), SprefError> {
        match value {
            Some(v) => self.save_string(key, Some(v)),
            None => Ok(()),
        }
    }

    pub fn save_non_null_int(&self, key: &str, value: Option<i32>) -> Result<(), SprefError> {
        match value {
            Some(v) => self.save_int(key, Some(v)),
            None => Ok(()),
        }
    }

    pub fn save_non_null_long(&self, key: &str, value: Option<i64>) -> Result<(), SprefError> {
        match value {
            Some(v) => self.save_long(key, Some(v)),
            None => Ok(()),
        }
    }

    pub fn save_non_null_float(&self, key: &str, value: Option<f32>) -> Result<(), SprefError> {
        match value {
            Some(v) => self.save_float(key, Some(v)),
            None => Ok(()),
        }
    }

    // --- encryption ----------------------------------------------------

    /// Read and decrypt a string without consulting its tag.
    ///
    /// `None` if no key is configured, the value is absent or empty, or it
    /// does not decrypt.
    pub fn get_encrypted_string(&self, key: &str) -> Option<String> {
        let cipher_key = self.cipher_key.as_ref()?;
        let raw = self.get_string(key).filter(|raw| !raw.is_empty())?;
        let plain = crypto::open_from_text(cipher_key.as_bytes(), &raw);
        if plain.is_none() {
            debug!(key = %key, "stored value did not decrypt");
        }
        plain
    }

    /// Read a setting, decrypting it if its tag says it is encrypted.
    pub fn get_safe_encrypted_setting(&self, key: &str) -> EncodedValue {
        if !self.is_key_encrypted(key) {
            return EncodedValue::plain(self.get_string(key));
        }

        let Some(cipher_key) = self.cipher_key.as_ref() else {
            warn!(key = %key, "setting is tagged encrypted but no cipher key is configured");
            return EncodedValue::internal_error();
        };

        let raw = match self.get_string(key) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                warn!(key = %key, "setting is tagged encrypted but has no ciphertext");
                return EncodedValue::internal_error();
            }
        };

        match crypto::open_from_text(cipher_key.as_bytes(), &raw) {
            Some(plain) => EncodedValue::decrypted(plain),
            None => {
                warn!(key = %key, "encrypted setting failed to decrypt");
                EncodedValue::decryption_error()
            }
        }
    }

    /// Store a string, encrypted when a cipher key is configured.
    ///
    /// The value and its tag are written in one batch. Without a key the value
    /// is stored verbatim and tagged unencrypted. `None` removes both the value
    /// and the tag instead of writing a `false` tag; either way
    /// [`is_key_encrypted`](Self::is_key_encrypted) then reports `false`.
    pub fn save_safe_encrypted_setting(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), SprefError> {
        reject_reserved(key)?;
        let tag = tag_key(key);
        let Some(value) = value else {
            return self.apply(EditBatch::new().remove(key).remove(tag));
        };

        let sealed = self
            .cipher_key
            .as_ref()
            .and_then(|cipher_key| crypto::seal_to_text(cipher_key.as_bytes(), value));

        let batch = match sealed {
            Some(ciphertext) => EditBatch::new().put(key, ciphertext).put(tag, true),
            None => {
                if self.cipher_key.is_some() {
                    warn!(key = %key, "encryption failed -- storing value unencrypted");
                }
                EditBatch::new().put(key, value).put(tag, false)
            }
        };
        self.apply(batch)
    }

    /// True if the tag for `key` records an encrypted value.
    pub fn is_key_encrypted(&self, key: &str) -> bool {
        let tag = tag_key(key);
        let value = self.backend.get_bool(&tag, false);
        self.degrade(&tag, value, false)
    }

    // --- removal -------------------------------------------------------

    /// Remove a setting and its encryption tag. Removing an absent key is a no-op.
    pub fn remove_setting(&self, key: &str) -> Result<(), SprefError> {
        reject_reserved(key)?;
        self.apply(EditBatch::new().remove(key).remove(tag_key(key)))
    }

    /// Remove each key in turn.
    ///
    /// A failing key does not stop the rest; the first error is returned once
    /// every key has been attempted.
    pub fn remove_bulk_setting<I, S>(&self, keys: I) -> Result<(), SprefError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first_error = None;
        for key in keys {
            let key = key.as_ref();
            if let Err(e) = self.remove_setting(key) {
                warn!(key = %key, error = %e, "bulk removal failed for key");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Remove every setting in the namespace, tags included.
    pub fn remove_all_settings(&self) -> Result<(), SprefError> {
        debug!(namespace = %self.name(), "clearing all settings");
        self.backend.clear()
    }

    pub(crate) fn backend(&self) -> &dyn PreferenceBackend {
        self.backend.as_ref()
    }

    pub(crate) fn apply(&self, batch: EditBatch) -> Result<(), SprefError> {
        self.backend.apply(batch)
    }

    /// Upsert or remove `key`, clearing any encryption tag in the same batch.
    fn save_plain(&self, key: &str, value: Option<PrefValue>) -> Result<(), SprefError> {
        reject_reserved(key)?;
        let batch = match value {
            Some(value) => EditBatch::new().put(key, value),
            None => EditBatch::new().remove(key),
        };
        self.apply(batch.remove(tag_key(key)))
    }

    /// Read through the backend; reserved keys read as a miss.
    fn read<T>(
        &self,
        key: &str,
        default: T,
        read: impl FnOnce(&dyn PreferenceBackend) -> Result<T, SprefError>,
    ) -> T {
        if is_tag_key(key) {
            debug!(key = %key, "read of reserved key -- returning default");
            return default;
        }
        let value = read(self.backend.as_ref());
        self.degrade(key, value, default)
    }

    fn degrade<T>(&self, key: &str, result: Result<T, SprefError>, default: T) -> T {
        result.unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "backend read failed -- returning default");
            default
        })
    }
}

fn reject_reserved(key: &str) -> Result<(), SprefError> {
    if is_tag_key(key) {
        return Err(SprefError::Config(format!(
            "`{key}` uses the reserved prefix `{ENCRYPTION_TAG_PREFIX}`"
        )));
    }
    Ok(())
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("namespace", &self.name())
            .field("cipher_key", &self.cipher_key)
            .finish()
    }
}
