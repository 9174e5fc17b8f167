// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment provider for the line-oriented `key = value` configuration file.
//!
//! Format rules:
//! - one `key = value` pair per line, split on the first `=`
//! - lines starting with `#` and lines without `=` are ignored
//! - keys are lower-cased, values lose surrounding `'` / `"` characters
//! - all-digit values become integers, everything else stays a string

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use figment::value::{Dict, Map, Value};
use figment::{Metadata, Profile, Provider, Source};
use tracing::{debug, warn};

use crate::diagnostic::ConfigError;

/// A single parsed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Integer(u64),
    Text(String),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Integer(n) => Value::from(n),
            RawValue::Text(s) => Value::from(s),
        }
    }
}

/// Parse `key = value` lines. Later duplicates win.
pub fn parse_key_values(content: &str) -> Vec<(String, RawValue)> {
    let mut entries: Vec<(String, RawValue)> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches(|c| c == '\'' || c == '"');

        let raw = if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            match value.parse::<u64>() {
                Ok(n) => RawValue::Integer(n),
                Err(_) => RawValue::Text(value.to_string()),
            }
        } else {
            RawValue::Text(value.to_string())
        };

        entries.retain(|(existing, _)| existing != &key);
        entries.push((key, raw));
    }

    entries
}

/// Read a configuration file.
///
/// Returns `Ok(None)` when the file does not exist or cannot be used as a
/// text file. Only a permission error on an existing file is fatal.
pub fn read_config_file(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(None)
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unusable configuration file");
            Ok(None)
        }
    }
}

/// Figment provider backed by parsed `key = value` content.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    path: Option<PathBuf>,
    entries: Vec<(String, RawValue)>,
}

impl KeyValueFile {
    /// Load the provider from disk. A missing file yields an empty provider.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?.unwrap_or_default();
        Ok(Self::new(path, &content))
    }

    /// Build the provider from content already read from `path`.
    pub fn new(path: &Path, content: &str) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            entries: parse_key_values(content),
        }
    }

    /// Build the provider from in-memory content.
    pub fn from_content(content: &str) -> Self {
        Self {
            path: None,
            entries: parse_key_values(content),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Provider for KeyValueFile {
    fn metadata(&self) -> Metadata {
        let metadata = Metadata::named("credparser config file");
        match &self.path {
            Some(path) => metadata.source(Source::File(path.clone())),
            None => metadata,
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        for (key, value) in &self.entries {
            dict.insert(key.clone(), value.clone().into());
        }
        Ok(Profile::Default.collect(dict))
    }
}
