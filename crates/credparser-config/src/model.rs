// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the credential codec.
//!
//! [`ConfigSettings`] is the raw, deserialized shape produced by the layered
//! loader. [`CodecConfig`] is the validated, immutable value the codec
//! consumes; it can only be obtained through [`CodecConfig::new`] or the
//! loader functions, so a partially valid configuration never exists.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostic::ConfigError;
use crate::validation::validate_settings;

/// Default number of plaintext salt characters prefixed to a credential string.
pub const DEFAULT_SALT_LEN: usize = 12;

/// Default lower bound for key-derivation hash rounds.
pub const DEFAULT_MIN_HASH_ROUNDS: u32 = 3;

/// Default modulus (upper bound) for key-derivation hash rounds.
pub const DEFAULT_MAX_HASH_ROUNDS: u32 = 24;

/// Keys accepted in the configuration file and environment.
pub const CONFIG_KEYS: &[&str] = &["salt_len", "max_hash_rounds", "min_hash_rounds"];

/// Raw configuration values after layering, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSettings {
    /// Length of the random salt in characters.
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    /// Maximum (modulus) number of key-derivation hash rounds.
    #[serde(default = "default_max_hash_rounds")]
    pub max_hash_rounds: u32,

    /// Minimum number of key-derivation hash rounds.
    #[serde(default = "default_min_hash_rounds")]
    pub min_hash_rounds: u32,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            salt_len: default_salt_len(),
            max_hash_rounds: default_max_hash_rounds(),
            min_hash_rounds: default_min_hash_rounds(),
        }
    }
}

fn default_salt_len() -> usize {
    DEFAULT_SALT_LEN
}

fn default_max_hash_rounds() -> u32 {
    DEFAULT_MAX_HASH_ROUNDS
}

fn default_min_hash_rounds() -> u32 {
    DEFAULT_MIN_HASH_ROUNDS
}

/// Explicit, caller-supplied values. These take precedence over the
/// environment, the configuration file and the built-in defaults.
///
/// Unset fields are skipped during serialization so they never shadow a
/// lower-priority layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_len: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hash_rounds: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_hash_rounds: Option<u32>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.salt_len.is_none() && self.max_hash_rounds.is_none() && self.min_hash_rounds.is_none()
    }
}

/// Validated codec parameters.
///
/// Invariants: `salt_len >= 8`, `min_hash_rounds >= 1`,
/// `max_hash_rounds >= min_hash_rounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    salt_len: usize,
    min_hash_rounds: u32,
    max_hash_rounds: u32,
}

impl CodecConfig {
    /// Build a configuration from explicit values, reporting every violated
    /// invariant.
    pub fn new(
        salt_len: usize,
        min_hash_rounds: u32,
        max_hash_rounds: u32,
    ) -> Result<Self, Vec<ConfigError>> {
        Self::try_from(ConfigSettings {
            salt_len,
            max_hash_rounds,
            min_hash_rounds,
        })
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len
    }

    pub fn min_hash_rounds(&self) -> u32 {
        self.min_hash_rounds
    }

    pub fn max_hash_rounds(&self) -> u32 {
        self.max_hash_rounds
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            salt_len: DEFAULT_SALT_LEN,
            min_hash_rounds: DEFAULT_MIN_HASH_ROUNDS,
            max_hash_rounds: DEFAULT_MAX_HASH_ROUNDS,
        }
    }
}

impl TryFrom<ConfigSettings> for CodecConfig {
    type Error = Vec<ConfigError>;

    fn try_from(settings: ConfigSettings) -> Result<Self, Self::Error> {
        validate_settings(&settings)?;
        Ok(Self {
            salt_len: settings.salt_len,
            min_hash_rounds: settings.min_hash_rounds,
            max_hash_rounds: settings.max_hash_rounds,
        })
    }
}

impl fmt::Display for CodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CodecConfig(salt_len={}, min_hash_rounds={}, max_hash_rounds={})",
            self.salt_len, self.min_hash_rounds, self.max_hash_rounds
        )
    }
}
