// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the CredParser credential codec.

use thiserror::Error;

/// The error type returned by every public CredParser operation.
///
/// Errors are raised at the point of failure and never retried; retrying
/// (for example re-prompting for credentials) is left to the caller.
#[derive(Debug, Error)]
pub enum CredParserError {
    /// Invalid caller input: conflicting constructor arguments, non-ASCII
    /// username or password, or a username longer than 255 bytes.
    #[error("usage error: {0}")]
    Usage(String),

    /// The master seed is missing, unreadable, or could not be created.
    #[error("initialization failure: {0}")]
    InitFailure(String),

    /// A credential string could not be decoded.
    ///
    /// Wrong seed, wrong signer, tampering and corruption all surface as this
    /// variant with the same message shape.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Encoding failed after input validation passed. Indicates a broken
    /// invariant somewhere else.
    #[error("encode failure: {0}")]
    EncodeFailure(String),

    /// Configuration file unreadable or resolved configuration invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CredParserError {
    /// The generic decode failure message.
    pub fn undecodable() -> Self {
        CredParserError::DecodeFailure(
            "invalid credential string, unable to decode with the current master seed and signer"
                .to_string(),
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CredParserError>;
