// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the CredParser credential codec.
//!
//! Resolves salt length and hash-round bounds by precedence: explicit
//! overrides, then `CREDPARSER_*` environment variables, then a line-oriented
//! `key = value` file, then built-in defaults. The result is validated into an
//! immutable [`CodecConfig`]; every violated rule is reported.
//!
//! # Usage
//!
//! ```no_run
//! use credparser_config::{load_and_validate, ConfigOverrides};
//!
//! let config = load_and_validate(&ConfigOverrides::default(), None).expect("config errors");
//! println!("salt length: {}", config.salt_len());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod source;
pub mod validation;

use std::path::Path;

use credparser_core::CredParserError;

pub use diagnostic::{ConfigError, config_failure, render_errors};
pub use loader::{default_config_path, load_config, load_config_from_path, load_config_from_str};
pub use model::{CodecConfig, ConfigOverrides, ConfigSettings};

/// Resolve configuration from `config_file` (or the default location) and
/// fold any diagnostics into a single [`CredParserError::Config`].
pub fn load_and_validate(
    overrides: &ConfigOverrides,
    config_file: Option<&Path>,
) -> Result<CodecConfig, CredParserError> {
    let result = match config_file {
        Some(path) => load_config_from_path(overrides, path),
        None => load_config(overrides),
    };
    result.map_err(|errors| config_failure(&errors))
}
