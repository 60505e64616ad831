// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end store scenarios.
//!
//! `TestHarness` opens a settings store over a throwaway SQLite file (or
//! memory) with optional key material and defaults, and can reopen the same
//! file to check persistence.

use std::sync::Arc;

use spref_core::SprefError;
use spref_settings::{DefaultsSource, MergeTrigger, SettingsBuilder, SettingsOptions, SettingsStore};
use spref_storage::Database;
use tempfile::TempDir;
use tracing::debug;

/// Builder for creating test stores with configurable options.
pub struct TestHarnessBuilder {
    name: String,
    passphrase: Option<String>,
    raw_key: Option<Vec<u8>>,
    defaults_xml: Option<String>,
    should_override: bool,
    trigger: MergeTrigger,
    in_memory: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            name: "test".to_string(),
            passphrase: None,
            raw_key: None,
            defaults_xml: None,
            should_override: false,
            trigger: MergeTrigger::Always,
            in_memory: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Some(passphrase.to_string());
        self
    }

    pub fn with_raw_key(mut self, key: &[u8]) -> Self {
        self.raw_key = Some(key.to_vec());
        self
    }

    /// Defaults document merged when the store opens.
    pub fn with_defaults_xml(mut self, xml: &str) -> Self {
        self.defaults_xml = Some(xml.to_string());
        self
    }

    pub fn with_override(mut self, should_override: bool) -> Self {
        self.should_override = should_override;
        self
    }

    pub fn with_trigger(mut self, trigger: MergeTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Use the in-memory engine instead of a temp SQLite file.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Build the harness and open the store.
    pub fn build(self) -> Result<TestHarness, SprefError> {
        let temp_dir = TempDir::new().map_err(SprefError::storage)?;
        let db_path = temp_dir.path().join("settings.db");

        let mut builder = SettingsBuilder::new()
            .with_name(self.name)
            .should_override(self.should_override)
            .merge_when(self.trigger);
        if let Some(passphrase) = self.passphrase {
            builder = builder.with_passphrase(passphrase);
        }
        if let Some(key) = self.raw_key {
            builder = builder.with_raw_key(key);
        }
        if let Some(xml) = self.defaults_xml {
            builder = builder.with_defaults(DefaultsSource::bytes(xml.into_bytes()));
        }
        let options = builder.build()?;

        let db = if self.in_memory {
            None
        } else {
            Some(Arc::new(Database::open(&db_path.to_string_lossy())?))
        };
        let store = match &db {
            Some(db) => options.open(Arc::clone(db)),
            None => options.open_in_memory(),
        };
        debug!(namespace = %options.name(), in_memory = db.is_none(), "test harness ready");

        Ok(TestHarness {
            store,
            options,
            db_path: db_path.to_string_lossy().to_string(),
            in_memory: self.in_memory,
            _temp_dir: temp_dir,
        })
    }
}

/// A store opened over throwaway storage.
pub struct TestHarness {
    pub store: SettingsStore,
    options: SettingsOptions,
    db_path: String,
    in_memory: bool,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Path of the SQLite file behind the store.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn options(&self) -> &SettingsOptions {
        &self.options
    }

    /// Open the same SQLite file again with `options`, running its merge.
    pub fn reopen_with(&self, options: &SettingsOptions) -> Result<SettingsStore, SprefError> {
        if self.in_memory {
            return Err(SprefError::Internal(
                "in-memory harness cannot be reopened".to_string(),
            ));
        }
        let db = Database::open(&self.db_path)?;
        Ok(options.open(Arc::new(db)))
    }

    /// Reopen with the original options.
    pub fn reopen(&self) -> Result<SettingsStore, SprefError> {
        self.reopen_with(&self.options)
    }
}
