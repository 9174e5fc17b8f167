// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. The `key = value` configuration file
//! 3. `CREDPARSER_SALT_LEN`, `CREDPARSER_MIN_HASH_ROUNDS`, `CREDPARSER_MAX_HASH_ROUNDS`
//! 4. Explicit [`ConfigOverrides`]

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use tracing::debug;

use crate::diagnostic::{self, ConfigError, FileSource};
use crate::model::{CONFIG_KEYS, CodecConfig, ConfigOverrides, ConfigSettings};
use crate::source::{KeyValueFile, read_config_file};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CREDPARSER_";

/// Default configuration file location: `<XDG config dir>/credparser/config`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("credparser").join("config"))
}

/// Build the Figment used for config loading.
///
/// Returned before extraction so callers can inspect metadata.
pub fn build_figment(file: KeyValueFile, overrides: &ConfigOverrides) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConfigSettings::default()))
        .merge(file)
        .merge(env_provider())
        .merge(Serialized::defaults(overrides))
}

/// Only the known keys are read so unrelated `CREDPARSER_*` variables never
/// trip unknown-key validation.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).only(CONFIG_KEYS)
}

/// Resolve configuration from the default file location.
pub fn load_config(overrides: &ConfigOverrides) -> Result<CodecConfig, Vec<ConfigError>> {
    match default_config_path() {
        Some(path) => load_config_from_path(overrides, &path),
        None => resolve(KeyValueFile::from_content(""), overrides, None),
    }
}

/// Resolve configuration from a specific `key = value` file.
///
/// A missing file contributes nothing; a permission error is fatal.
pub fn load_config_from_path(
    overrides: &ConfigOverrides,
    path: &Path,
) -> Result<CodecConfig, Vec<ConfigError>> {
    let content = read_config_file(path).map_err(|e| vec![e])?;
    let file = KeyValueFile::new(path, content.as_deref().unwrap_or_default());
    let source = content
        .as_deref()
        .map(|content| FileSource { path, content });
    resolve(file, overrides, source)
}

/// Resolve configuration from in-memory `key = value` content.
pub fn load_config_from_str(
    overrides: &ConfigOverrides,
    content: &str,
) -> Result<CodecConfig, Vec<ConfigError>> {
    resolve(KeyValueFile::from_content(content), overrides, None)
}

fn resolve(
    file: KeyValueFile,
    overrides: &ConfigOverrides,
    source: Option<FileSource<'_>>,
) -> Result<CodecConfig, Vec<ConfigError>> {
    let settings: ConfigSettings = build_figment(file, overrides)
        .extract()
        .map_err(|err| diagnostic::figment_to_config_errors(err, source))?;

    let config = CodecConfig::try_from(settings)?;
    debug!(%config, "configuration resolved");
    Ok(config)
}
