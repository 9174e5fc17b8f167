// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment extraction errors into miette diagnostics with source
//! spans into the `key = value` file and "did you mean?" suggestions using
//! Jaro-Winkler string similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::Path;

use credparser_core::CredParserError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(credparser::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(credparser::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// The configuration file exists but cannot be read.
    #[error("unable to read configuration file {path}: {reason}")]
    #[diagnostic(
        code(credparser::config::unreadable),
        help("check the file permissions or point --config at another file")
    )]
    Unreadable { path: String, reason: String },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(credparser::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(credparser::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// The configuration file content that figment errors may point into.
#[derive(Debug, Clone, Copy)]
pub struct FileSource<'a> {
    pub path: &'a Path,
    pub content: &'a str,
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// Errors raised by `file` get a source span on the offending key.
pub fn figment_to_config_errors(
    err: figment::Error,
    file: Option<FileSource<'_>>,
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let (span, src) = match &error.kind {
                Kind::UnknownField(field, _) => locate(&error, field, file),
                _ => locate(&error, &error_key(&error), file),
            };
            match &error.kind {
                Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: error_key(&error),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn error_key(error: &figment::error::Error) -> String {
    error.path.join(".")
}

/// Span of `field` in `file`, when `error` was raised by that file.
fn locate(
    error: &figment::error::Error,
    field: &str,
    file: Option<FileSource<'_>>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(file) = file else {
        return (None, None);
    };
    let from_file = matches!(
        error.metadata.as_ref().and_then(|m| m.source.as_ref()),
        Some(figment::Source::File(path)) if path == file.path
    );

    match find_key_offset(file.content, field) {
        Some(offset) if from_file => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(
                file.path.display().to_string(),
                file.content.to_string(),
            )),
        ),
        _ => (None, None),
    }
}

/// Find the byte offset of `field` at the start of a `key = value` line.
///
/// Keys are matched case-insensitively since the loader lower-cases them.
pub fn find_key_offset(content: &str, field: &str) -> Option<usize> {
    let mut byte_offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if !trimmed.starts_with('#')
            && let Some((key, _)) = trimmed.split_once('=')
            && key.trim_end().eq_ignore_ascii_case(field)
        {
            return Some(byte_offset + indent);
        }
        byte_offset += line.len();
    }
    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Fold a list of diagnostics into a single [`CredParserError::Config`]
/// naming every problem.
pub fn config_failure(errors: &[ConfigError]) -> CredParserError {
    let message = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" - ");
    CredParserError::Config(message)
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_salt_len_for_typo() {
        let valid = &["salt_len", "max_hash_rounds", "min_hash_rounds"];
        assert_eq!(suggest_key("salt_lne", valid), Some("salt_len".to_string()));
    }

    #[test]
    fn suggest_max_rounds_for_typo() {
        let valid = &["salt_len", "max_hash_rounds", "min_hash_rounds"];
        assert_eq!(
            suggest_key("max_hash_round", valid),
            Some("max_hash_rounds".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["salt_len", "max_hash_rounds", "min_hash_rounds"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_skips_comments() {
        let content = "# salt_lne = 1\n  salt_lne = 12\n";
        let offset = find_key_offset(content, "salt_lne").unwrap();
        assert_eq!(&content[offset..offset + 8], "salt_lne");
        assert_eq!(offset, 17);
    }

    fn unknown_key_error(path: &Path) -> figment::Error {
        let mut error = figment::Error::from(figment::error::Kind::UnknownField(
            "salt_lne".to_string(),
            &["salt_len", "max_hash_rounds", "min_hash_rounds"],
        ));
        error.metadata = Some(
            figment::Metadata::named("credparser config file")
                .source(figment::Source::File(path.to_path_buf())),
        );
        error
    }

    #[test]
    fn unknown_key_from_file_gets_span_and_suggestion() {
        let path = Path::new("/etc/credparser/config");
        let content = "# tuned\nsalt_lne = 16\n";
        let errors = figment_to_config_errors(
            unknown_key_error(path),
            Some(FileSource { path, content }),
        );

        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                src,
                ..
            } => {
                assert_eq!(key, "salt_lne");
                assert_eq!(suggestion.as_deref(), Some("salt_len"));
                let span = (*span).expect("span into the file");
                assert_eq!(span.offset(), 8);
                assert_eq!(span.len(), 8);
                assert!(src.is_some());
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn error_from_other_file_gets_no_span() {
        let content = "salt_lne = 16\n";
        let errors = figment_to_config_errors(
            unknown_key_error(Path::new("/somewhere/else")),
            Some(FileSource {
                path: Path::new("/etc/credparser/config"),
                content,
            }),
        );

        assert!(matches!(
            &errors[0],
            ConfigError::UnknownKey { span: None, src: None, .. }
        ));
    }

    #[test]
    fn config_failure_joins_every_message() {
        let errors = vec![
            ConfigError::Validation {
                message: "salt_len must be at least 8, got 4".to_string(),
            },
            ConfigError::Validation {
                message: "min_hash_rounds must be at least 1, got 0".to_string(),
            },
        ];
        let err = config_failure(&errors);
        let text = err.to_string();
        assert!(text.contains("salt_len"));
        assert!(text.contains("min_hash_rounds"));
        assert!(text.contains(" - "));
    }
}
