// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the spref settings store.
//!
//! This crate provides the error type, the typed value model, and the
//! [`PreferenceBackend`] trait that every persistent engine implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SprefError;
pub use traits::PreferenceBackend;
pub use types::{
    EditBatch, Mutation, PrefValue, ValueKind, INVALID_FLOAT, INVALID_INT, INVALID_LONG,
};
