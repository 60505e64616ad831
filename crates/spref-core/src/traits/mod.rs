// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the persistent-engine seam.

pub mod backend;

pub use backend::PreferenceBackend;
