// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios over a SQLite-backed settings store.

use spref_core::{INVALID_INT, INVALID_LONG};
use spref_settings::{EncryptionState, MergeTrigger, SettingsBuilder, ENCRYPTION_TAG_PREFIX};
use spref_test_utils::TestHarness;
use spref_vault::{crypto, CipherKey};

const GREETING_DEFAULTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<defaults>
    <string name="greeting">hi</string>
    <integer name="retries">3</integer>
    <boolean name="telemetry">false</boolean>
</defaults>"#;

#[test]
fn saved_greeting_survives_merge_without_override() {
    let harness = TestHarness::builder().build().unwrap();
    harness.store.save_string("greeting", Some("bonjour")).unwrap();

    let options = SettingsBuilder::new()
        .with_name("test")
        .with_defaults_bytes(GREETING_DEFAULTS)
        .build()
        .unwrap();
    let store = harness.reopen_with(&options).unwrap();

    assert_eq!(store.get_string("greeting").as_deref(), Some("bonjour"));
    assert_eq!(store.get_int("retries"), 3);
    assert!(!store.get_bool("telemetry", true));
}

#[test]
fn override_merge_replaces_saved_greeting() {
    let harness = TestHarness::builder().build().unwrap();
    harness.store.save_string("greeting", Some("bonjour")).unwrap();

    let options = SettingsBuilder::new()
        .with_name("test")
        .with_defaults_bytes(GREETING_DEFAULTS)
        .should_override(true)
        .build()
        .unwrap();
    let store = harness.reopen_with(&options).unwrap();

    assert_eq!(store.get_string("greeting").as_deref(), Some("hi"));
}

#[test]
fn int_save_read_remove_cycle() {
    let harness = TestHarness::builder().build().unwrap();
    let store = &harness.store;

    store.save_int("age", Some(5)).unwrap();
    assert_eq!(store.get_int("age"), 5);
    store.remove_setting("age").unwrap();
    assert_eq!(store.get_int("age"), INVALID_INT);
}

#[test]
fn encrypted_value_persists_across_reopen() {
    let harness = TestHarness::builder()
        .with_passphrase("correct horse")
        .build()
        .unwrap();
    harness
        .store
        .save_safe_encrypted_setting("api_token", Some("tok-123"))
        .unwrap();

    let store = harness.reopen().unwrap();
    assert!(store.is_key_encrypted("api_token"));
    let read = store.get_safe_encrypted_setting("api_token");
    assert_eq!(read.state(), EncryptionState::SuccessfullyDecrypted);
    assert_eq!(read.value(), Some("tok-123"));

    let at_rest = store.get_string("api_token").unwrap();
    assert_ne!(at_rest, "tok-123");
    assert!(!at_rest.contains('+') && !at_rest.contains('/'));
}

#[test]
fn reopening_without_a_key_reports_internal_error() {
    let harness = TestHarness::builder()
        .with_raw_key(b"0123456789abcdef-extra-bytes-ignored")
        .build()
        .unwrap();
    harness
        .store
        .save_safe_encrypted_setting("secret", Some("v"))
        .unwrap();

    let keyless = SettingsBuilder::new().with_name("test").build().unwrap();
    let store = harness.reopen_with(&keyless).unwrap();
    let read = store.get_safe_encrypted_setting("secret");
    assert_eq!(read.state(), EncryptionState::InternalError);
    assert_eq!(read.value(), None);
    assert_eq!(store.get_encrypted_string("secret"), None);
}

#[test]
fn removal_leaves_no_entry_and_no_tag() {
    let harness = TestHarness::builder().with_passphrase("k").build().unwrap();
    let store = &harness.store;
    store.save_safe_encrypted_setting("secret", Some("v")).unwrap();
    store.remove_setting("secret").unwrap();

    assert!(!store.contains("secret"));
    assert!(!store.is_key_encrypted("secret"));
    assert!(!store.contains(&format!("{ENCRYPTION_TAG_PREFIX}secret")));
}

#[test]
fn legacy_standard_base64_ciphertext_still_decrypts() {
    let harness = TestHarness::builder().with_passphrase("legacy").build().unwrap();
    let key = CipherKey::from_passphrase("legacy");
    let plaintext = "a value long enough to span several AES blocks ~~~ ???";

    let url_safe = crypto::seal_to_text(key.as_bytes(), plaintext).unwrap();
    let standard: String = url_safe.replace('-', "+").replace('_', "/");
    let wrapped = format!("{}\n{}", &standard[..20], &standard[20..]);
    harness.store.save_string("old", Some(&wrapped)).unwrap();

    assert_eq!(
        harness.store.get_encrypted_string("old").as_deref(),
        Some(plaintext)
    );
}

#[test]
fn if_empty_trigger_only_seeds_fresh_stores() {
    let fresh = TestHarness::builder()
        .with_defaults_xml(GREETING_DEFAULTS)
        .with_trigger(MergeTrigger::IfEmpty)
        .build()
        .unwrap();
    assert_eq!(fresh.store.get_string("greeting").as_deref(), Some("hi"));

    fresh.store.remove_setting("greeting").unwrap();
    let reopened = fresh.reopen().unwrap();
    assert_eq!(reopened.get_string("greeting"), None);
    assert_eq!(reopened.get_int("retries"), 3);
}

#[test]
fn malformed_defaults_leave_the_store_untouched() {
    let harness = TestHarness::builder().build().unwrap();
    harness.store.save_long("quota", Some(10)).unwrap();

    let options = SettingsBuilder::new()
        .with_name("test")
        .with_defaults_bytes("<defaults><long name=\"quota\">99</long><unclosed>")
        .should_override(true)
        .build()
        .unwrap();
    let store = harness.reopen_with(&options).unwrap();

    assert_eq!(store.get_long("quota"), 10);
    assert_eq!(store.entries().len(), 1);
}

#[test]
fn missing_defaults_file_is_not_fatal() {
    let harness = TestHarness::builder().in_memory().build().unwrap();
    let options = SettingsBuilder::new()
        .with_name("test")
        .with_defaults_file("/nonexistent/defaults.xml")
        .build()
        .unwrap();
    let store = options.open_in_memory();
    assert!(store.is_empty());
    assert!(harness.reopen().is_err());
}

#[test]
fn unparsable_default_is_stored_as_sentinel() {
    let harness = TestHarness::builder()
        .in_memory()
        .with_defaults_xml(r#"<d><long name="quota">lots</long></d>"#)
        .build()
        .unwrap();
    assert!(harness.store.contains("quota"));
    assert_eq!(harness.store.get_long_or("quota", 0), INVALID_LONG);
}

#[test]
fn namespaces_in_one_file_stay_separate() {
    let harness = TestHarness::builder().with_name("first").build().unwrap();
    harness.store.save_string("k", Some("one")).unwrap();

    let second = SettingsBuilder::new().with_name("second").build().unwrap();
    let other = harness.reopen_with(&second).unwrap();
    assert_eq!(other.get_string("k"), None);

    other.remove_all_settings().unwrap();
    assert_eq!(harness.store.get_string("k").as_deref(), Some("one"));
}
