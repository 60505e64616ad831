// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand bodies. Each writes its output to `out` so tests can capture it.

use std::io::Write;

use spref_core::{PrefValue, SprefError, ValueKind};
use spref_settings::{
    DefaultsDocument, DefaultsSource, MergeEngine, MergeReport, MergeTrigger, SettingsStore,
};

fn write_err(e: std::io::Error) -> SprefError {
    SprefError::Internal(format!("failed to write output: {e}"))
}

/// Print one setting. Returns `false` if the key is absent.
pub fn get(
    store: &SettingsStore,
    key: &str,
    kind: Option<ValueKind>,
    decrypt: bool,
    out: &mut impl Write,
) -> Result<bool, SprefError> {
    if decrypt {
        let read = store.get_safe_encrypted_setting(key);
        if !read.state().is_success() {
            return Err(SprefError::Encryption(format!(
                "cannot read `{key}`: {}",
                read.state()
            )));
        }
        return match read.value() {
            Some(value) => {
                writeln!(out, "{value}").map_err(write_err)?;
                Ok(true)
            }
            None => Ok(false),
        };
    }

    let Some(value) = store.get_value(key) else {
        return Ok(false);
    };
    if let Some(expected) = kind.filter(|expected| *expected != value.kind()) {
        return Err(SprefError::Serialization(format!(
            "`{key}` holds a {} value, not {expected}",
            value.kind()
        )));
    }
    writeln!(out, "{}", value.to_text()).map_err(write_err)?;
    Ok(true)
}

/// Store one setting parsed from its command-line text.
pub fn set(
    store: &SettingsStore,
    key: &str,
    text: &str,
    kind: ValueKind,
    encrypt: bool,
) -> Result<(), SprefError> {
    if !encrypt {
        return store.save_value(key, PrefValue::parse(kind, text)?);
    }
    if kind != ValueKind::String {
        return Err(SprefError::Config(format!(
            "only string values can be encrypted, not {kind}"
        )));
    }
    if !store.has_cipher_key() {
        return Err(SprefError::Config(
            "no encryption key configured; set encryption.passphrase or pass --ask-passphrase"
                .to_string(),
        ));
    }
    store.save_safe_encrypted_setting(key, Some(text))
}

/// Print every setting, one per line, or as a JSON object.
pub fn list(store: &SettingsStore, json: bool, out: &mut impl Write) -> Result<(), SprefError> {
    let entries = store.entries();
    if json {
        serde_json::to_writer_pretty(&mut *out, &entries)
            .map_err(|e| SprefError::Serialization(e.to_string()))?;
        writeln!(out).map_err(write_err)?;
        return Ok(());
    }

    for (key, value) in &entries {
        let kind = if store.is_key_encrypted(key) {
            "encrypted".to_string()
        } else {
            value.kind().to_string()
        };
        writeln!(out, "{key}\t{kind}\t{}", value.to_text()).map_err(write_err)?;
    }
    Ok(())
}

/// Merge a defaults file into the store, surfacing any failure.
pub fn merge(
    store: &SettingsStore,
    source: &DefaultsSource,
    should_override: bool,
    if_empty: bool,
    out: &mut impl Write,
) -> Result<MergeReport, SprefError> {
    let trigger = if if_empty {
        MergeTrigger::IfEmpty
    } else {
        MergeTrigger::Always
    };
    let report = MergeEngine::new(should_override)
        .with_trigger(trigger)
        .merge_document(store, source)?;

    writeln!(
        out,
        "applied {} (strings {}, integers {}, floats {}, longs {}, booleans {}); retained {}; sentinels {}",
        report.applied(),
        report.strings,
        report.integers,
        report.floats,
        report.longs,
        report.booleans,
        report.retained,
        report.sentinels,
    )
    .map_err(write_err)?;
    Ok(report)
}

/// Parse a defaults document and print its entries without touching a store.
pub fn show_defaults(
    source: &DefaultsSource,
    json: bool,
    out: &mut impl Write,
) -> Result<(), SprefError> {
    let document = DefaultsDocument::load(source)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, document.entries())
            .map_err(|e| SprefError::Serialization(e.to_string()))?;
        writeln!(out).map_err(write_err)?;
        return Ok(());
    }

    for entry in document.entries() {
        let text = PrefValue::from(entry.value.clone()).to_text();
        let marker = if entry.substituted { "\t(unparsed)" } else { "" };
        writeln!(
            out,
            "{}\t{}\t{text}{marker}",
            entry.name,
            entry.value.element_name()
        )
        .map_err(write_err)?;
    }
    if document.skipped() > 0 {
        writeln!(out, "# {} entries skipped", document.skipped()).map_err(write_err)?;
    }
    Ok(())
}
