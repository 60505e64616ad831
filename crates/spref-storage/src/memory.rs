// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory PreferenceBackend, for tests and ephemeral stores.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use spref_core::{EditBatch, Mutation, PrefValue, PreferenceBackend, SprefError};

/// A namespace held in a `BTreeMap` behind an `RwLock`.
///
/// A batch is applied under a single write guard, so readers never observe
/// half of it.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespace: String,
    entries: RwLock<BTreeMap<String, PrefValue>>,
}

impl MemoryBackend {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, PrefValue>>, SprefError> {
        self.entries
            .read()
            .map_err(|_| SprefError::storage("memory backend lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, PrefValue>>, SprefError> {
        self.entries
            .write()
            .map_err(|_| SprefError::storage("memory backend lock poisoned"))
    }
}

impl PreferenceBackend for MemoryBackend {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<PrefValue>, SprefError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn get_all(&self) -> Result<BTreeMap<String, PrefValue>, SprefError> {
        Ok(self.read()?.clone())
    }

    fn apply(&self, batch: EditBatch) -> Result<(), SprefError> {
        let mut entries = self.write()?;
        for mutation in batch.into_mutations() {
            match mutation {
                Mutation::Put { key, value } => {
                    entries.insert(key, value);
                }
                Mutation::Remove { key } => {
                    entries.remove(&key);
                }
                Mutation::Clear => entries.clear(),
            }
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, SprefError> {
        Ok(self.read()?.contains_key(key))
    }

    fn is_empty(&self) -> Result<bool, SprefError> {
        Ok(self.read()?.is_empty())
    }
}
