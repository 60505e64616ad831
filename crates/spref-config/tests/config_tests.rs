// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the spref configuration system.

use std::io::Write;

use serial_test::serial;
use spref_config::diagnostic::ConfigError;
use spref_config::model::{MergeWhen, SprefConfig};
use spref_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};

#[test]
fn valid_toml_deserializes_into_spref_config() {
    let toml = r#"
[store]
name = "app"
database_path = "/tmp/app.db"
wal_mode = false

[encryption]
passphrase = "correct horse"

[defaults]
path = "/etc/app/defaults.xml"
should_override = true
merge_when = "if_empty"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.store.name, "app");
    assert_eq!(config.store.database_path, "/tmp/app.db");
    assert!(!config.store.wal_mode);
    assert_eq!(config.encryption.passphrase.as_deref(), Some("correct horse"));
    assert_eq!(config.encryption.key_hex, None);
    assert_eq!(config.defaults.path.as_deref(), Some("/etc/app/defaults.xml"));
    assert!(config.defaults.should_override);
    assert_eq!(config.defaults.merge_when, MergeWhen::IfEmpty);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("[logging]\nlevel = \"warn\"\n").unwrap();
    assert_eq!(config.store, SprefConfig::default().store);
    assert_eq!(config.defaults.merge_when, MergeWhen::Always);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn unknown_field_in_store_produces_error() {
    let err = load_config_from_str("[store]\nnmae = \"x\"\n").expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("nmae"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    assert!(load_config_from_str("[network]\nport = 1\n").is_err());
}

#[test]
fn diagnostic_suggests_correction_and_lists_valid_keys() {
    let errors = load_and_validate_str("[defaults]\nshould_overide = true\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "should_overide");
            assert_eq!(suggestion.as_deref(), Some("should_override"));
            assert!(valid_keys.contains("merge_when"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn diagnostic_invalid_type_names_the_key() {
    let errors = load_and_validate_str("[store]\nwal_mode = \"yes\"\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key.contains("wal_mode")
    )));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[store]\nnmae = \"x\"\n").unwrap_err();
    let diagnostic: &dyn Diagnostic = &errors[0];
    assert_eq!(
        diagnostic.code().map(|c| c.to_string()).as_deref(),
        Some("spref::config::unknown_key")
    );

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, diagnostic)
        .unwrap();
    assert!(buf.contains("nmae"));
}

#[test]
fn load_and_validate_reports_semantic_errors() {
    let toml = r#"
[encryption]
passphrase = "a"
key_hex = "000102030405060708090a0b0c0d0e0f"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("mutually exclusive"))
    ));
}

#[test]
#[serial]
fn missing_config_file_is_silently_skipped() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/spref.toml")).unwrap();
    assert_eq!(config.store.name, SprefConfig::default().store.name);
}

#[test]
#[serial]
fn env_vars_override_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[store]\nname = \"from-file\"\ndatabase_path = \"/tmp/a.db\"").unwrap();

    // SAFETY: env-var tests in this file run under #[serial].
    unsafe {
        std::env::set_var("SPREF_STORE_NAME", "from-env");
        std::env::set_var("SPREF_DEFAULTS_SHOULD_OVERRIDE", "true");
        std::env::set_var("SPREF_PASSPHRASE", "not-a-config-key");
    }
    let result = load_and_validate_path(file.path());
    unsafe {
        std::env::remove_var("SPREF_STORE_NAME");
        std::env::remove_var("SPREF_DEFAULTS_SHOULD_OVERRIDE");
        std::env::remove_var("SPREF_PASSPHRASE");
    }

    let config = result.expect("env overrides should validate");
    assert_eq!(config.store.name, "from-env");
    assert_eq!(config.store.database_path, "/tmp/a.db");
    assert!(config.defaults.should_override);
}

#[test]
fn figment_merge_order_puts_later_layers_on_top() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: SprefConfig = Figment::new()
        .merge(Serialized::defaults(SprefConfig::default()))
        .merge(Toml::string("[store]\nname = \"file\"\n"))
        .merge(("store.name", "override"))
        .extract()
        .unwrap();
    assert_eq!(config.store.name, "override");
}
