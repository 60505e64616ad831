// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value model shared by the store, the persistent engines, and the CLI.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SprefError;

/// Returned by integer reads when the key is absent.
pub const INVALID_INT: i32 = -1;

/// Returned by long reads when the key is absent.
pub const INVALID_LONG: i64 = -1;

/// Returned by float reads when the key is absent.
pub const INVALID_FLOAT: f32 = -1.0;

/// The kind of a stored value.
///
/// JSON lists are stored as [`ValueKind::String`] holding a JSON array; they
/// have no kind of their own at rest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Int,
    Long,
    Float,
    Bool,
    StringSet,
}

/// A single typed preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Bool(bool),
    StringSet(BTreeSet<String>),
}

impl PrefValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PrefValue::String(_) => ValueKind::String,
            PrefValue::Int(_) => ValueKind::Int,
            PrefValue::Long(_) => ValueKind::Long,
            PrefValue::Float(_) => ValueKind::Float,
            PrefValue::Bool(_) => ValueKind::Bool,
            PrefValue::StringSet(_) => ValueKind::StringSet,
        }
    }

    /// Render the value as the text form used at rest and on the command line.
    ///
    /// String sets render as a JSON array; every other kind uses its `Display`
    /// form, which round-trips through [`PrefValue::parse`].
    pub fn to_text(&self) -> String {
        match self {
            PrefValue::String(s) => s.clone(),
            PrefValue::Int(v) => v.to_string(),
            PrefValue::Long(v) => v.to_string(),
            PrefValue::Float(v) => v.to_string(),
            PrefValue::Bool(v) => v.to_string(),
            PrefValue::StringSet(set) => {
                serde_json::to_string(set).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    /// Parse text into a value of the given kind.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, SprefError> {
        let invalid = |e: &dyn std::fmt::Display| {
            SprefError::Serialization(format!("cannot read `{text}` as {kind}: {e}"))
        };
        Ok(match kind {
            ValueKind::String => PrefValue::String(text.to_string()),
            ValueKind::Int => PrefValue::Int(text.trim().parse().map_err(|e| invalid(&e))?),
            ValueKind::Long => PrefValue::Long(text.trim().parse().map_err(|e| invalid(&e))?),
            ValueKind::Float => PrefValue::Float(text.trim().parse().map_err(|e| invalid(&e))?),
            ValueKind::Bool => PrefValue::Bool(text.trim().parse().map_err(|e| invalid(&e))?),
            ValueKind::StringSet => {
                PrefValue::StringSet(serde_json::from_str(text).map_err(|e| invalid(&e))?)
            }
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            PrefValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            PrefValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PrefValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            PrefValue::StringSet(set) => Some(set),
            _ => None,
        }
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

impl From<i32> for PrefValue {
    fn from(value: i32) -> Self {
        PrefValue::Int(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Long(value)
    }
}

impl From<f32> for PrefValue {
    fn from(value: f32) -> Self {
        PrefValue::Float(value)
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<BTreeSet<String>> for PrefValue {
    fn from(value: BTreeSet<String>) -> Self {
        PrefValue::StringSet(value)
    }
}

/// One change inside an [`EditBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert or replace the value stored under a key.
    Put { key: String, value: PrefValue },
    /// Delete a key. Deleting an absent key is a no-op.
    Remove { key: String },
    /// Delete every key in the namespace.
    Clear,
}

/// An ordered set of mutations applied to a backend in one call.
///
/// Backends apply a batch atomically and in order: a `Clear` followed by a
/// `Put` leaves exactly that one key behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBatch {
    mutations: Vec<Mutation>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an upsert.
    pub fn put(mut self, key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        self.mutations.push(Mutation::Put {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queue a removal.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.mutations.push(Mutation::Remove { key: key.into() });
        self
    }

    /// Queue a namespace-wide clear.
    pub fn clear(mut self) -> Self {
        self.mutations.push(Mutation::Clear);
        self
    }

    /// Append a mutation in place.
    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn value_kind_display_and_parse_round_trip() {
        for kind in [
            ValueKind::String,
            ValueKind::Int,
            ValueKind::Long,
            ValueKind::Float,
            ValueKind::Bool,
            ValueKind::StringSet,
        ] {
            let text = kind.to_string();
            assert_eq!(ValueKind::from_str(&text).unwrap(), kind);
        }
        assert_eq!(ValueKind::StringSet.to_string(), "string_set");
    }

    #[test]
    fn parse_rejects_non_numeric_int() {
        let err = PrefValue::parse(ValueKind::Int, "five").unwrap_err();
        assert!(err.to_string().contains("five"));
    }

    #[test]
    fn parse_trims_numeric_text_but_not_strings() {
        assert_eq!(PrefValue::parse(ValueKind::Long, " 42 ").unwrap(), PrefValue::Long(42));
        assert_eq!(
            PrefValue::parse(ValueKind::String, " padded ").unwrap(),
            PrefValue::String(" padded ".into())
        );
    }

    #[test]
    fn string_set_text_is_a_json_array() {
        let set: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        let value = PrefValue::StringSet(set.clone());
        assert_eq!(value.to_text(), r#"["a","b"]"#);
        assert_eq!(
            PrefValue::parse(ValueKind::StringSet, &value.to_text()).unwrap(),
            PrefValue::StringSet(set)
        );
    }

    #[test]
    fn typed_accessors_reject_other_kinds() {
        let value = PrefValue::Int(5);
        assert_eq!(value.as_int(), Some(5));
        assert_eq!(value.as_long(), None);
        assert_eq!(value.as_str(), None);
        assert_eq!(value.kind(), ValueKind::Int);
    }

    #[test]
    fn edit_batch_keeps_insertion_order() {
        let batch = EditBatch::new().clear().put("a", 1).remove("b");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.mutations()[0], Mutation::Clear);
        assert_eq!(
            batch.mutations()[1],
            Mutation::Put {
                key: "a".into(),
                value: PrefValue::Int(1)
            }
        );
        assert_eq!(batch.mutations()[2], Mutation::Remove { key: "b".into() });
    }

    proptest::proptest! {
        #[test]
        fn float_text_round_trips(v in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
            let value = PrefValue::Float(v);
            proptest::prop_assert_eq!(PrefValue::parse(ValueKind::Float, &value.to_text()).unwrap(), value);
        }
    }
}
