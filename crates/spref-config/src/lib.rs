// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the spref settings store.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use spref_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Store: {}", config.store.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use diagnostic::TomlSource;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    DefaultsConfig, EncryptionConfig, LoggingConfig, MergeWhen, SprefConfig, StoreConfig,
};

/// Load from the standard file locations and the environment, then validate.
pub fn load_and_validate() -> Result<SprefConfig, Vec<ConfigError>> {
    finish(loader::load_config(), standard_sources)
}

/// Load from `path` plus the environment, then validate.
pub fn load_and_validate_path(path: &Path) -> Result<SprefConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load from a TOML string alone, then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<SprefConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or turn the load failure into diagnostics.
///
/// `sources` is only read on failure, to place spans on the offending keys.
fn finish(
    loaded: Result<SprefConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<TomlSource>,
) -> Result<SprefConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// The TOML files the standard load may have read, most specific first.
fn standard_sources() -> Vec<TomlSource> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());
    let user = dirs::config_dir().map(|dir| dir.join("spref").join(loader::LOCAL_CONFIG_FILE));
    let system = Some(Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf());

    std::iter::once(Some(local))
        .chain([user, system])
        .flatten()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
