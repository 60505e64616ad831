// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed, optionally encrypted settings with declarative defaults.
//!
//! A [`SettingsStore`] reads and writes typed values in one namespace of a
//! [`spref_core::PreferenceBackend`]. Individual string values can be stored
//! AES-encrypted, with a tag entry recording which keys are. On open, a
//! [`DefaultsDocument`] can seed absent keys (or override all of them) through
//! the [`MergeEngine`].
//!
//! ```no_run
//! use spref_settings::SettingsBuilder;
//!
//! let store = SettingsBuilder::new()
//!     .with_name("app")
//!     .with_passphrase("correct horse")
//!     .with_defaults_file("defaults.xml")
//!     .build()?
//!     .open_in_memory();
//! store.save_safe_encrypted_setting("token", Some("s3cret"))?;
//! # Ok::<(), spref_core::SprefError>(())
//! ```

pub mod builder;
pub mod defaults;
pub mod handle;
pub mod merge;
pub mod store;
pub mod tags;

pub use builder::{SettingsBuilder, SettingsOptions};
pub use defaults::{DefaultEntry, DefaultValue, DefaultsDocument, DefaultsSource};
pub use handle::Settings;
pub use merge::{MergeEngine, MergeReport, MergeTrigger};
pub use store::SettingsStore;
pub use tags::ENCRYPTION_TAG_PREFIX;
pub use spref_vault::{EncodedValue, EncryptionState};
