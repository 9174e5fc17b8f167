// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for CredParser integration tests.
//!
//! Provides an isolated seed directory with deterministic seed fixtures so
//! tests never touch `~/.credparser` or depend on the account running them.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, ZERO_SEED_LEN};
