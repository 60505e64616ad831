// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preference CRUD operations, scoped by namespace.

use std::collections::BTreeMap;
use std::str::FromStr;

use rusqlite::{params, OptionalExtension};
use spref_core::{EditBatch, Mutation, PrefValue, SprefError, ValueKind};
use tracing::warn;

use crate::database::Database;

/// Get one preference.
pub fn get_preference(
    db: &Database,
    namespace: &str,
    key: &str,
) -> Result<Option<PrefValue>, SprefError> {
    let row = db.with_conn(|conn| {
        conn.query_row(
            "SELECT kind, value FROM preferences WHERE namespace = ?1 AND key = ?2",
            params![namespace, key],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
    })?;

    row.map(|(kind, value)| decode_row(key, &kind, &value))
        .transpose()
}

/// List every preference in a namespace, ordered by key.
///
/// Rows that no longer decode are skipped with a warning.
pub fn list_preferences(
    db: &Database,
    namespace: &str,
) -> Result<BTreeMap<String, PrefValue>, SprefError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT key, kind, value FROM preferences WHERE namespace = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![namespace], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        rows.collect::<Result<Vec<_>, _>>()
    })?;

    let mut entries = BTreeMap::new();
    for (key, kind, value) in rows {
        match decode_row(&key, &kind, &value) {
            Ok(decoded) => {
                entries.insert(key, decoded);
            }
            Err(e) => warn!(key = %key, error = %e, "skipping undecodable preference row"),
        }
    }
    Ok(entries)
}

/// Returns true if `key` exists in the namespace.
pub fn preference_exists(db: &Database, namespace: &str, key: &str) -> Result<bool, SprefError> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM preferences WHERE namespace = ?1 AND key = ?2)",
            params![namespace, key],
            |row| row.get(0),
        )
    })
}

/// Count the preferences in a namespace.
pub fn count_preferences(db: &Database, namespace: &str) -> Result<i64, SprefError> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM preferences WHERE namespace = ?1",
            params![namespace],
            |row| row.get(0),
        )
    })
}

/// Apply a batch of mutations in one transaction.
///
/// Either every mutation lands or none does.
pub fn apply_batch(db: &Database, namespace: &str, batch: EditBatch) -> Result<(), SprefError> {
    if batch.is_empty() {
        return Ok(());
    }

    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        for mutation in batch.mutations() {
            match mutation {
                Mutation::Put { key, value } => {
                    tx.execute(
                        "INSERT INTO preferences (namespace, key, kind, value, updated_at)
                         VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                         ON CONFLICT (namespace, key) DO UPDATE SET
                             kind = excluded.kind,
                             value = excluded.value,
                             updated_at = excluded.updated_at",
                        params![namespace, key, value.kind().to_string(), value.to_text()],
                    )?;
                }
                Mutation::Remove { key } => {
                    tx.execute(
                        "DELETE FROM preferences WHERE namespace = ?1 AND key = ?2",
                        params![namespace, key],
                    )?;
                }
                Mutation::Clear => {
                    tx.execute(
                        "DELETE FROM preferences WHERE namespace = ?1",
                        params![namespace],
                    )?;
                }
            }
        }
        tx.commit()
    })
}

fn decode_row(key: &str, kind: &str, value: &str) -> Result<PrefValue, SprefError> {
    let kind = ValueKind::from_str(kind).map_err(|_| {
        SprefError::Serialization(format!("preference `{key}` has unknown kind `{kind}`"))
    })?;
    PrefValue::parse(kind, value)
}
