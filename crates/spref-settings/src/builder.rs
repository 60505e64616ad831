// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building settings stores.
//!
//! [`SettingsBuilder`] collects options by value; [`SettingsBuilder::build`]
//! validates them into immutable [`SettingsOptions`], which open stores over a
//! SQLite database, memory, or any other backend. Opening runs the defaults
//! merge before the store is returned.

use std::path::PathBuf;
use std::sync::Arc;

use spref_config::model::{MergeWhen, SprefConfig};
use spref_core::{PreferenceBackend, SprefError};
use spref_storage::{Database, MemoryBackend, SqliteBackend};
use spref_vault::{CipherKey, KeyMaterial};
use tracing::debug;

use crate::defaults::DefaultsSource;
use crate::merge::{MergeEngine, MergeReport, MergeTrigger};
use crate::store::SettingsStore;
use crate::tags::is_tag_key;

/// Fluent, by-value builder for [`SettingsOptions`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    name: Option<String>,
    key: Option<KeyMaterial>,
    defaults: Option<DefaultsSource>,
    should_override: bool,
    trigger: MergeTrigger,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from loaded configuration.
    pub fn from_config(config: &SprefConfig) -> Result<Self, SprefError> {
        let mut builder = Self::new()
            .with_name(config.store.name.clone())
            .should_override(config.defaults.should_override)
            .merge_when(match config.defaults.merge_when {
                MergeWhen::Always => MergeTrigger::Always,
                MergeWhen::IfEmpty => MergeTrigger::IfEmpty,
            });

        if let Some(passphrase) = &config.encryption.passphrase {
            builder = builder.with_key(KeyMaterial::passphrase(passphrase.clone()));
        }
        if let Some(key_hex) = &config.encryption.key_hex {
            let material =
                KeyMaterial::from_hex(key_hex).map_err(|e| SprefError::Config(e.to_string()))?;
            builder = builder.with_key(material);
        }
        if let Some(path) = &config.defaults.path {
            builder = builder.with_defaults(DefaultsSource::file(path));
        }
        Ok(builder)
    }

    /// Name of the namespace. Required.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_key(mut self, key: KeyMaterial) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_passphrase(self, passphrase: impl Into<String>) -> Self {
        self.with_key(KeyMaterial::passphrase(passphrase))
    }

    pub fn with_raw_key(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_key(KeyMaterial::raw(bytes))
    }

    pub fn with_defaults(mut self, source: DefaultsSource) -> Self {
        self.defaults = Some(source);
        self
    }

    pub fn with_defaults_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_defaults(DefaultsSource::file(path))
    }

    pub fn with_defaults_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_defaults(DefaultsSource::bytes(bytes))
    }

    /// Let document values replace existing keys during the merge.
    pub fn should_override(mut self, should_override: bool) -> Self {
        self.should_override = should_override;
        self
    }

    pub fn merge_when(mut self, trigger: MergeTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Validate the options. Key material is resolved here.
    pub fn build(self) -> Result<SettingsOptions, SprefError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| SprefError::Config("store name must be set and non-empty".into()))?;
        if is_tag_key(&name) {
            return Err(SprefError::Config(format!(
                "store name `{name}` uses the reserved tag prefix"
            )));
        }

        let cipher_key = self
            .key
            .as_ref()
            .map(KeyMaterial::resolve)
            .transpose()
            .map_err(|e| match e {
                SprefError::Encryption(msg) => SprefError::Config(msg),
                other => other,
            })?;

        Ok(SettingsOptions {
            name,
            cipher_key,
            defaults: self.defaults,
            merge: MergeEngine::new(self.should_override).with_trigger(self.trigger),
        })
    }
}

/// Validated, immutable store options.
#[derive(Debug, Clone)]
pub struct SettingsOptions {
    name: String,
    cipher_key: Option<CipherKey>,
    defaults: Option<DefaultsSource>,
    merge: MergeEngine,
}

impl SettingsOptions {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_cipher_key(&self) -> bool {
        self.cipher_key.is_some()
    }

    pub fn defaults(&self) -> Option<&DefaultsSource> {
        self.defaults.as_ref()
    }

    pub fn merge_engine(&self) -> MergeEngine {
        self.merge
    }

    /// Open the namespace inside a shared SQLite database.
    pub fn open(&self, db: Arc<Database>) -> SettingsStore {
        self.open_with_backend(Box::new(SqliteBackend::new(db, self.name.clone())))
    }

    /// Open an ephemeral in-memory store.
    pub fn open_in_memory(&self) -> SettingsStore {
        self.open_with_backend(Box::new(MemoryBackend::new(self.name.clone())))
    }

    /// Open a store over `backend`, merging defaults first.
    pub fn open_with_backend(&self, backend: Box<dyn PreferenceBackend>) -> SettingsStore {
        let store = SettingsStore::new(backend, self.cipher_key.clone());
        self.seed(&store);
        store
    }

    /// Run the configured defaults merge, if any.
    pub fn seed(&self, store: &SettingsStore) -> MergeReport {
        match &self.defaults {
            Some(source) => self.merge.merge(store, source),
            None => {
                debug!(namespace = %store.name(), "no defaults source configured");
                MergeReport::default()
            }
        }
    }
}
