// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the CredParser workspace.
//!
//! Every crate in the workspace reports failures through [`CredParserError`],
//! so callers only ever match on one error type regardless of which layer
//! (configuration, master seed, codec, facade) produced it.

pub mod error;

pub use error::{CredParserError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credparser_error_has_all_variants() {
        let _usage = CredParserError::Usage("test".into());
        let _init = CredParserError::InitFailure("test".into());
        let _decode = CredParserError::DecodeFailure("test".into());
        let _encode = CredParserError::EncodeFailure("test".into());
        let _config = CredParserError::Config("test".into());
    }

    #[test]
    fn display_prefixes_error_kind() {
        let err = CredParserError::DecodeFailure("bad string".into());
        assert_eq!(err.to_string(), "decode failure: bad string");

        let err = CredParserError::Config("salt_len must be >= 8".into());
        assert_eq!(err.to_string(), "configuration error: salt_len must be >= 8");
    }
}
