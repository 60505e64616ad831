// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A shareable handle that may or may not have a store behind it.

use std::sync::Arc;

use spref_core::SprefError;

use crate::store::SettingsStore;

/// Settings handle passed to the code that needs it.
///
/// Starts out [`Settings::Unconfigured`]; every access through an
/// unconfigured handle returns [`SprefError::NotConfigured`].
#[derive(Debug, Clone, Default)]
pub enum Settings {
    #[default]
    Unconfigured,
    Configured(Arc<SettingsStore>),
}

impl Settings {
    pub fn configured(store: SettingsStore) -> Self {
        Settings::Configured(Arc::new(store))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Settings::Configured(_))
    }

    /// The store, or [`SprefError::NotConfigured`].
    pub fn store(&self) -> Result<&Arc<SettingsStore>, SprefError> {
        match self {
            Settings::Configured(store) => Ok(store),
            Settings::Unconfigured => Err(SprefError::NotConfigured),
        }
    }
}

impl From<SettingsStore> for Settings {
    fn from(store: SettingsStore) -> Self {
        Settings::configured(store)
    }
}
