// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PreferenceBackend trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use spref_core::{EditBatch, PrefValue, PreferenceBackend, SprefError};
use tracing::debug;

use crate::database::Database;
use crate::queries::preferences;

/// SQLite-backed preference namespace.
///
/// Several backends may share one [`Database`], each scoped to its own
/// namespace. Delegates to the typed query module.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db: Arc<Database>,
    namespace: String,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    /// The shared database handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

impl PreferenceBackend for SqliteBackend {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<PrefValue>, SprefError> {
        preferences::get_preference(&self.db, &self.namespace, key)
    }

    fn get_all(&self) -> Result<BTreeMap<String, PrefValue>, SprefError> {
        preferences::list_preferences(&self.db, &self.namespace)
    }

    fn apply(&self, batch: EditBatch) -> Result<(), SprefError> {
        debug!(namespace = %self.namespace, mutations = batch.len(), "applying batch");
        preferences::apply_batch(&self.db, &self.namespace, batch)
    }

    fn contains(&self, key: &str) -> Result<bool, SprefError> {
        preferences::preference_exists(&self.db, &self.namespace, key)
    }

    fn is_empty(&self) -> Result<bool, SprefError> {
        Ok(preferences::count_preferences(&self.db, &self.namespace)? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn typed_reads_go_through_the_database() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let backend = SqliteBackend::new(db, "app");
        backend
            .apply(EditBatch::new().put("volume", 7).put("name", "Ada"))
            .unwrap();

        assert_eq!(backend.get_int("volume", -1).unwrap(), 7);
        assert_eq!(backend.get_string("name", None).unwrap().as_deref(), Some("Ada"));
        // Kind mismatch is a miss.
        assert_eq!(backend.get_long("name", -1).unwrap(), -1);
        assert!(backend.contains("volume").unwrap());
        assert!(!backend.is_empty().unwrap());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist.db");
        let path = path.to_str().unwrap();

        {
            let backend = SqliteBackend::new(Arc::new(Database::open(path).unwrap()), "app");
            backend.apply(EditBatch::new().put("theme", "dark")).unwrap();
        }

        let backend = SqliteBackend::new(Arc::new(Database::open(path).unwrap()), "app");
        assert_eq!(
            backend.get_string("theme", None).unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn two_namespaces_share_one_database() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let first = SqliteBackend::new(Arc::clone(&db), "first");
        let second = SqliteBackend::new(db, "second");

        first.apply(EditBatch::new().put("k", 1)).unwrap();
        assert!(second.is_empty().unwrap());
        second.clear().unwrap();
        assert_eq!(first.get_int("k", -1).unwrap(), 1);
    }
}
