// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for spref integration tests.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder};
