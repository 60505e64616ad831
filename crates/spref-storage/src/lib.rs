// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence engines for the spref settings store.
//!
//! Provides a WAL-mode SQLite engine with embedded migrations and an
//! in-memory engine. Both implement [`spref_core::PreferenceBackend`] and
//! apply each edit batch atomically.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteBackend;
pub use database::Database;
pub use memory::MemoryBackend;
