// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./spref.toml` > `~/.config/spref/spref.toml` > `/etc/spref/spref.toml`
//! with environment variable overrides via `SPREF_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SprefConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/spref/spref.toml";

/// File name looked up in the working directory and the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "spref.toml";

/// Config sections reachable through `SPREF_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["store", "encryption", "defaults", "logging"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/spref/spref.toml` (system-wide)
/// 3. `~/.config/spref/spref.toml` (user XDG config)
/// 4. `./spref.toml` (local directory)
/// 5. `SPREF_*` environment variables
pub fn load_config() -> Result<SprefConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SprefConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SprefConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SprefConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SprefConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SprefConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("spref").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that `SPREF_STORE_DATABASE_PATH`
/// maps to `store.database_path`, not `store.database.path`. Variables outside the
/// known sections (such as `SPREF_PASSPHRASE`) are not config keys and are skipped.
fn env_provider() -> Env {
    Env::prefixed("SPREF_")
        .filter(|key| {
            let key = key.as_str();
            ENV_SECTIONS
                .iter()
                .any(|section| key.len() > section.len() + 1 && key.starts_with(&format!("{section}_")))
        })
        .map(|key| {
            let key_str = key.as_str();
            let mapped = ENV_SECTIONS
                .iter()
                .find(|section| key_str.starts_with(&format!("{section}_")))
                .map(|section| key_str.replacen(&format!("{section}_"), &format!("{section}."), 1))
                .unwrap_or_else(|| key_str.to_string());
            mapped.into()
        })
}
