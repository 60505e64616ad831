// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent engine trait for preference namespaces (SQLite, in-memory, ...).

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SprefError;
use crate::types::{EditBatch, PrefValue};

/// A persistent key-value engine scoped to one namespace.
///
/// Implementations must apply each [`EditBatch`] atomically and preserve the
/// order of a single caller's sequential batches. Reads of a key stored with a
/// different kind than requested return the caller's default: a type mismatch
/// is a miss, never an error.
pub trait PreferenceBackend: Send + Sync {
    /// The namespace (store name) all keys are scoped to.
    fn namespace(&self) -> &str;

    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<PrefValue>, SprefError>;

    /// Returns every entry in the namespace.
    fn get_all(&self) -> Result<BTreeMap<String, PrefValue>, SprefError>;

    /// Applies all mutations of the batch atomically, in order.
    fn apply(&self, batch: EditBatch) -> Result<(), SprefError>;

    /// Returns true if `key` has a stored value.
    fn contains(&self, key: &str) -> Result<bool, SprefError> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns true if the namespace holds no entries.
    fn is_empty(&self) -> Result<bool, SprefError> {
        Ok(self.get_all()?.is_empty())
    }

    /// Deletes every entry in the namespace.
    fn clear(&self) -> Result<(), SprefError> {
        self.apply(EditBatch::new().clear())
    }

    fn get_string(&self, key: &str, default: Option<String>) -> Result<Option<String>, SprefError> {
        Ok(typed(self.get(key)?, key, default, |v| match v {
            PrefValue::String(s) => Some(Some(s)),
            _ => None,
        }))
    }

    fn get_int(&self, key: &str, default: i32) -> Result<i32, SprefError> {
        Ok(typed(self.get(key)?, key, default, |v| v.as_int()))
    }

    fn get_long(&self, key: &str, default: i64) -> Result<i64, SprefError> {
        Ok(typed(self.get(key)?, key, default, |v| v.as_long()))
    }

    fn get_float(&self, key: &str, default: f32) -> Result<f32, SprefError> {
        Ok(typed(self.get(key)?, key, default, |v| v.as_float()))
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool, SprefError> {
        Ok(typed(self.get(key)?, key, default, |v| v.as_bool()))
    }
}

/// Narrow a raw read to one kind, falling back to `default` on a miss or a
/// kind mismatch.
fn typed<T>(
    raw: Option<PrefValue>,
    key: &str,
    default: T,
    pick: impl FnOnce(PrefValue) -> Option<T>,
) -> T {
    match raw {
        None => default,
        Some(value) => {
            let kind = value.kind();
            pick(value).unwrap_or_else(|| {
                debug!(key = %key, stored = %kind, "kind mismatch on read -- returning default");
                default
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::types::Mutation;

    /// Minimal engine for exercising the provided methods.
    struct MapBackend(Mutex<BTreeMap<String, PrefValue>>);

    impl PreferenceBackend for MapBackend {
        fn namespace(&self) -> &str {
            "test"
        }

        fn get(&self, key: &str) -> Result<Option<PrefValue>, SprefError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn get_all(&self) -> Result<BTreeMap<String, PrefValue>, SprefError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn apply(&self, batch: EditBatch) -> Result<(), SprefError> {
            let mut map = self.0.lock().unwrap();
            for m in batch.into_mutations() {
                match m {
                    Mutation::Put { key, value } => {
                        map.insert(key, value);
                    }
                    Mutation::Remove { key } => {
                        map.remove(&key);
                    }
                    Mutation::Clear => map.clear(),
                }
            }
            Ok(())
        }
    }

    fn backend() -> MapBackend {
        MapBackend(Mutex::new(BTreeMap::new()))
    }

    #[test]
    fn typed_reads_return_default_on_miss() {
        let b = backend();
        assert_eq!(b.get_int("missing", -1).unwrap(), -1);
        assert_eq!(b.get_string("missing", None).unwrap(), None);
        assert!(b.get_bool("missing", true).unwrap());
    }

    #[test]
    fn typed_reads_return_default_on_kind_mismatch() {
        let b = backend();
        b.apply(EditBatch::new().put("age", "five")).unwrap();
        assert_eq!(b.get_int("age", -1).unwrap(), -1);
        assert_eq!(b.get_string("age", None).unwrap().as_deref(), Some("five"));
    }

    #[test]
    fn clear_and_is_empty_use_the_batch_path() {
        let b = backend();
        b.apply(EditBatch::new().put("a", 1).put("b", true)).unwrap();
        assert!(!b.is_empty().unwrap());
        assert!(b.contains("a").unwrap());
        b.clear().unwrap();
        assert!(b.is_empty().unwrap());
    }
}
