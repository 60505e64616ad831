// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merging a defaults document into a settings store.
//!
//! Entries are folded into one map per kind, filtered by the conflict policy
//! against the live store, then written in a single batch in the order
//! strings, integers, floats, longs, booleans. When two kinds declare the same
//! key the later kind wins.

use std::collections::BTreeMap;

use serde::Serialize;
use spref_core::{EditBatch, Mutation, PrefValue, SprefError};
use tracing::{debug, info, warn};

use crate::defaults::{DefaultValue, DefaultsDocument, DefaultsSource};
use crate::store::SettingsStore;
use crate::tags::tag_key;

/// When a merge is allowed to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeTrigger {
    /// Every time.
    #[default]
    Always,
    /// Only when the store holds no settings.
    IfEmpty,
}

/// What a merge wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub strings: usize,
    pub integers: usize,
    pub floats: usize,
    pub longs: usize,
    pub booleans: usize,
    /// Keys left alone because the store already had them.
    pub retained: usize,
    /// Accepted entries whose body did not parse and became a sentinel.
    pub sentinels: usize,
}

impl MergeReport {
    /// Number of keys written.
    pub fn applied(&self) -> usize {
        self.strings + self.integers + self.floats + self.longs + self.booleans
    }
}

/// Applies defaults documents under a conflict policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeEngine {
    should_override: bool,
    trigger: MergeTrigger,
}

/// Per-kind accumulators. Later duplicates of a key replace earlier ones.
#[derive(Default)]
struct Aggregated {
    strings: BTreeMap<String, String>,
    integers: BTreeMap<String, i32>,
    floats: BTreeMap<String, f32>,
    longs: BTreeMap<String, i64>,
    booleans: BTreeMap<String, bool>,
}

impl MergeEngine {
    /// `should_override` decides whether document values replace existing keys.
    pub fn new(should_override: bool) -> Self {
        Self {
            should_override,
            trigger: MergeTrigger::Always,
        }
    }

    pub fn with_trigger(mut self, trigger: MergeTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn should_override(&self) -> bool {
        self.should_override
    }

    pub fn trigger(&self) -> MergeTrigger {
        self.trigger
    }

    /// Merge `source` into `store`, swallowing failures.
    ///
    /// A document that cannot be read or parsed leaves the store untouched and
    /// yields an empty report; the cause is logged.
    pub fn merge(&self, store: &SettingsStore, source: &DefaultsSource) -> MergeReport {
        match self.merge_document(store, source) {
            Ok(report) => report,
            Err(e) => {
                warn!(namespace = %store.name(), error = %e, "defaults merge abandoned");
                MergeReport::default()
            }
        }
    }

    /// Merge `source` into `store`, returning any failure.
    pub fn merge_document(
        &self,
        store: &SettingsStore,
        source: &DefaultsSource,
    ) -> Result<MergeReport, SprefError> {
        if self.trigger == MergeTrigger::IfEmpty && !store.backend().is_empty()? {
            debug!(namespace = %store.name(), "store not empty -- skipping defaults merge");
            return Ok(MergeReport::default());
        }

        let document = DefaultsDocument::load(source)?;
        self.apply_document(store, &document)
    }

    /// Apply an already-parsed document. The trigger is not consulted.
    pub fn apply_document(
        &self,
        store: &SettingsStore,
        document: &DefaultsDocument,
    ) -> Result<MergeReport, SprefError> {
        let mut report = MergeReport::default();
        let mut aggregated = Aggregated::default();

        for entry in document.entries() {
            if !self.should_override && store.backend().contains(&entry.name)? {
                report.retained += 1;
                continue;
            }
            if entry.substituted {
                report.sentinels += 1;
            }
            let name = entry.name.clone();
            match &entry.value {
                DefaultValue::String(v) => {
                    aggregated.strings.insert(name, v.clone());
                }
                DefaultValue::Integer(v) => {
                    aggregated.integers.insert(name, *v);
                }
                DefaultValue::Float(v) => {
                    aggregated.floats.insert(name, *v);
                }
                DefaultValue::Long(v) => {
                    aggregated.longs.insert(name, *v);
                }
                DefaultValue::Boolean(v) => {
                    aggregated.booleans.insert(name, *v);
                }
            }
        }

        report.strings = aggregated.strings.len();
        report.integers = aggregated.integers.len();
        report.floats = aggregated.floats.len();
        report.longs = aggregated.longs.len();
        report.booleans = aggregated.booleans.len();

        let mut batch = EditBatch::new();
        put_all(&mut batch, aggregated.strings, PrefValue::String);
        put_all(&mut batch, aggregated.integers, PrefValue::Int);
        put_all(&mut batch, aggregated.floats, PrefValue::Float);
        put_all(&mut batch, aggregated.longs, PrefValue::Long);
        put_all(&mut batch, aggregated.booleans, PrefValue::Bool);

        if !batch.is_empty() {
            store.apply(batch)?;
        }

        info!(
            namespace = %store.name(),
            applied = report.applied(),
            retained = report.retained,
            sentinels = report.sentinels,
            should_override = self.should_override,
            "defaults merged"
        );
        Ok(report)
    }
}

/// Queue writes for one kind. Each write also clears the key's encryption tag.
fn put_all<T>(batch: &mut EditBatch, values: BTreeMap<String, T>, wrap: fn(T) -> PrefValue) {
    for (key, value) in values {
        let tag = tag_key(&key);
        batch.push(Mutation::Put {
            key,
            value: wrap(value),
        });
        batch.push(Mutation::Remove { key: tag });
    }
}
