// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for codec settings.
//!
//! Collects every violated rule instead of stopping at the first, so a single
//! run reports everything that needs fixing.

use crate::diagnostic::ConfigError;
use crate::model::ConfigSettings;

/// Smallest accepted salt length.
pub const MIN_SALT_LEN: usize = 8;

/// Validate layered settings for semantic correctness.
pub fn validate_settings(settings: &ConfigSettings) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if settings.salt_len < MIN_SALT_LEN {
        errors.push(ConfigError::Validation {
            message: format!(
                "salt_len must be at least {MIN_SALT_LEN}, got {}",
                settings.salt_len
            ),
        });
    }

    if settings.min_hash_rounds < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "min_hash_rounds must be at least 1, got {}",
                settings.min_hash_rounds
            ),
        });
    }

    if settings.max_hash_rounds < settings.min_hash_rounds {
        errors.push(ConfigError::Validation {
            message: format!(
                "max_hash_rounds must be at least min_hash_rounds ({}), got {}",
                settings.min_hash_rounds, settings.max_hash_rounds
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
