// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential string encoding and decoding.
//!
//! A credential string is `salt || base64(ciphertext)` where the ciphertext is
//! the scrambled message `salt || len(username) || username || password`.
//! The plaintext salt prefix must match the salt recovered from the message,
//! which is how a wrong seed, a wrong signer or a corrupted string is caught.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use credparser_config::CodecConfig;
use credparser_core::{CredParserError, Result};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::cipher::{scramble, unscramble};
use crate::kdf::derive_key;

/// Longest username that fits the single length byte of the message.
pub const MAX_USERNAME_LEN: usize = u8::MAX as usize;

/// Check that a username is ASCII and fits the length byte.
pub fn validate_username(username: &str) -> Result<()> {
    if !username.is_ascii() {
        return Err(CredParserError::Usage(
            "username must contain only ASCII characters".into(),
        ));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(CredParserError::Usage(format!(
            "username is {} bytes long, the maximum is {MAX_USERNAME_LEN}",
            username.len()
        )));
    }
    Ok(())
}

/// Check that a password is ASCII.
pub fn validate_password(password: &str) -> Result<()> {
    if !password.is_ascii() {
        return Err(CredParserError::Usage(
            "password must contain only ASCII characters".into(),
        ));
    }
    Ok(())
}

/// Draw `len` characters from `0-9a-zA-Z` using the OS random source.
pub fn generate_salt(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Stateless codec parameterized by a validated [`CodecConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialCodec {
    config: CodecConfig,
}

impl CredentialCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a username/password pair under a freshly generated salt.
    pub fn encode(
        &self,
        seed: &[u8],
        username: &str,
        password: &str,
        signer: &str,
    ) -> Result<String> {
        let salt = generate_salt(self.config.salt_len());
        self.encode_with_salt(seed, &salt, username, password, signer)
    }

    /// Encode under a caller-chosen salt.
    ///
    /// The salt must be exactly `salt_len` alphanumeric characters. Reusing a
    /// salt produces identical output for identical inputs, so production
    /// callers should use [`encode`](Self::encode).
    pub fn encode_with_salt(
        &self,
        seed: &[u8],
        salt: &str,
        username: &str,
        password: &str,
        signer: &str,
    ) -> Result<String> {
        let salt_len = self.config.salt_len();
        if salt.len() != salt_len || !salt.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(CredParserError::Usage(format!(
                "salt must be exactly {salt_len} alphanumeric characters"
            )));
        }
        validate_username(username)?;
        validate_password(password)?;

        let message = frame_message(salt, username, password)?;
        let key = derive_key(seed, salt, signer, &self.config);
        let ciphertext = Zeroizing::new(scramble(&message, key.as_slice()));

        Ok(format!("{salt}{}", STANDARD.encode(ciphertext.as_slice())))
    }

    /// Recover the username/password pair from a credential string.
    ///
    /// Every failure after the structural checks is reported with the same
    /// message so callers cannot tell a wrong seed from a wrong signer or a
    /// corrupted string.
    pub fn decode(
        &self,
        seed: &[u8],
        credentials: &str,
        signer: &str,
    ) -> Result<(String, SecretString)> {
        let salt_len = self.config.salt_len();
        if !credentials.is_ascii() {
            return Err(CredParserError::DecodeFailure(
                "credential string contains non-ASCII characters".into(),
            ));
        }
        if credentials.len() < salt_len {
            return Err(CredParserError::DecodeFailure(format!(
                "credential string is shorter than the {salt_len}-character salt"
            )));
        }

        let (salt, body) = credentials.split_at(salt_len);
        let ciphertext = Zeroizing::new(STANDARD.decode(body).map_err(|_| {
            CredParserError::DecodeFailure("credential string body is not valid base64".into())
        })?);

        let key = derive_key(seed, salt, signer, &self.config);
        let message = Zeroizing::new(unscramble(&ciphertext, key.as_slice()));

        parse_message(&message, salt)
    }
}

fn frame_message(salt: &str, username: &str, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let username_len = u8::try_from(username.len()).map_err(|_| {
        CredParserError::EncodeFailure("username length does not fit the length byte".into())
    })?;

    let mut message = Zeroizing::new(Vec::with_capacity(
        salt.len() + 1 + username.len() + password.len(),
    ));
    message.extend_from_slice(salt.as_bytes());
    message.push(username_len);
    message.extend_from_slice(username.as_bytes());
    message.extend_from_slice(password.as_bytes());
    Ok(message)
}

fn parse_message(message: &[u8], salt: &str) -> Result<(String, SecretString)> {
    let salt_len = salt.len();
    if message.len() <= salt_len || &message[..salt_len] != salt.as_bytes() {
        return Err(CredParserError::undecodable());
    }

    let start = salt_len + 1;
    let end = start + usize::from(message[salt_len]);
    if end > message.len() {
        return Err(CredParserError::undecodable());
    }

    let username = ascii_string(&message[start..end])?;
    let password = ascii_string(&message[end..])?;
    Ok((username, SecretString::from(password)))
}

fn ascii_string(bytes: &[u8]) -> Result<String> {
    if !bytes.is_ascii() {
        return Err(CredParserError::undecodable());
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| CredParserError::undecodable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    const ZERO_SEED: [u8; 1024] = [0u8; 1024];
    const KNOWN_ANSWER: &str = "aaaaaaaaaaaahGZ9r9ZuSR9GQUbtH4Sgjrpf+9oB/1Hsfg==";

    fn codec() -> CredentialCodec {
        CredentialCodec::default()
    }

    fn decode_err(credentials: &str) -> CredParserError {
        codec()
            .decode(&ZERO_SEED, credentials, "svc")
            .expect_err("decode should fail")
    }

    #[test]
    fn encode_known_answer() {
        let encoded = codec()
            .encode_with_salt(&ZERO_SEED, "aaaaaaaaaaaa", "user", "password", "svc")
            .unwrap();
        assert_eq!(encoded, KNOWN_ANSWER);
    }

    #[test]
    fn decode_known_answer() {
        let (username, password) = codec().decode(&ZERO_SEED, KNOWN_ANSWER, "svc").unwrap();
        assert_eq!(username, "user");
        assert_eq!(password.expose_secret(), "password");
    }

    #[test]
    fn generated_salt_is_alphanumeric_and_sized() {
        for len in [8, 12, 32] {
            let salt = generate_salt(len);
            assert_eq!(salt.len(), len);
            assert!(salt.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn encode_uses_fresh_salt_each_time() {
        let first = codec().encode(&ZERO_SEED, "user", "password", "svc").unwrap();
        let second = codec().encode(&ZERO_SEED, "user", "password", "svc").unwrap();
        assert_ne!(first, second);
        assert!(first[..12].bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn encode_with_salt_rejects_bad_salt() {
        for salt in ["short", "aaaaaaaaaaaaa", "aaaaaaaaaaa!"] {
            let err = codec()
                .encode_with_salt(&ZERO_SEED, salt, "user", "password", "svc")
                .unwrap_err();
            assert!(matches!(err, CredParserError::Usage(_)), "salt {salt:?}: {err}");
        }
    }

    #[test]
    fn username_boundary() {
        let longest = "u".repeat(255);
        let encoded = codec().encode(&ZERO_SEED, &longest, "pw", "svc").unwrap();
        let (username, password) = codec().decode(&ZERO_SEED, &encoded, "svc").unwrap();
        assert_eq!(username, longest);
        assert_eq!(password.expose_secret(), "pw");

        let too_long = "u".repeat(256);
        let err = codec().encode(&ZERO_SEED, &too_long, "pw", "svc").unwrap_err();
        assert!(matches!(err, CredParserError::Usage(_)));
    }

    #[test]
    fn non_ascii_inputs_are_usage_errors() {
        let err = codec().encode(&ZERO_SEED, "usér", "pw", "svc").unwrap_err();
        assert!(matches!(err, CredParserError::Usage(_)));
        let err = codec().encode(&ZERO_SEED, "user", "pässword", "svc").unwrap_err();
        assert!(matches!(err, CredParserError::Usage(_)));
    }

    #[test]
    fn empty_username_and_password_round_trip() {
        let encoded = codec().encode(&ZERO_SEED, "", "", "svc").unwrap();
        let (username, password) = codec().decode(&ZERO_SEED, &encoded, "svc").unwrap();
        assert_eq!(username, "");
        assert_eq!(password.expose_secret(), "");
    }

    #[test]
    fn wrong_signer_fails() {
        let err = codec().decode(&ZERO_SEED, KNOWN_ANSWER, "other").unwrap_err();
        assert!(matches!(err, CredParserError::DecodeFailure(_)));
    }

    #[test]
    fn wrong_seed_fails() {
        let err = codec().decode(&[1u8; 1024], KNOWN_ANSWER, "svc").unwrap_err();
        assert!(matches!(err, CredParserError::DecodeFailure(_)));
    }

    #[test]
    fn wrong_seed_and_wrong_signer_are_indistinguishable() {
        let by_signer = codec().decode(&ZERO_SEED, KNOWN_ANSWER, "other").unwrap_err();
        let by_seed = codec().decode(&[1u8; 1024], KNOWN_ANSWER, "svc").unwrap_err();
        assert_eq!(by_signer.to_string(), by_seed.to_string());
    }

    #[test]
    fn tampering_with_salt_or_salt_block_fails() {
        // The plaintext salt and the first 16 base64 characters, which carry
        // the encrypted copy of the salt.
        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=!";
        for position in 0..28 {
            let original = KNOWN_ANSWER.as_bytes()[position] as char;
            for replacement in alphabet.chars().filter(|c| *c != original) {
                let mut tampered = KNOWN_ANSWER.to_string();
                tampered.replace_range(position..=position, &replacement.to_string());
                let err = decode_err(&tampered);
                assert!(
                    matches!(err, CredParserError::DecodeFailure(_)),
                    "position {position} -> {replacement:?}: {err}"
                );
            }
        }
    }

    #[test]
    fn malformed_inputs_fail() {
        for credentials in [
            "",
            "aaaaaaaaaaa",
            "aaaaaaaaaaaa",
            "aaaaaaaaaaaa!!!!",
            "aaaaaaaaaaaahGZ9",
            "aaaaaaaaaaaé",
        ] {
            let err = decode_err(credentials);
            assert!(
                matches!(err, CredParserError::DecodeFailure(_)),
                "{credentials:?}: {err}"
            );
        }
    }

    #[test]
    fn length_byte_past_end_fails() {
        let config = CodecConfig::default();
        let salt = "aaaaaaaaaaaa";
        let mut message = salt.as_bytes().to_vec();
        message.push(200);
        message.extend_from_slice(b"short");
        let key = derive_key(&ZERO_SEED, salt, "svc", &config);
        let forged = format!("{salt}{}", STANDARD.encode(scramble(&message, key.as_slice())));

        let err = decode_err(&forged);
        assert!(matches!(err, CredParserError::DecodeFailure(_)));
    }

    #[test]
    fn non_ascii_payload_fails() {
        let config = CodecConfig::default();
        let salt = "aaaaaaaaaaaa";
        let mut message = salt.as_bytes().to_vec();
        message.push(1);
        message.push(b'u');
        message.push(0xC3);
        let key = derive_key(&ZERO_SEED, salt, "svc", &config);
        let forged = format!("{salt}{}", STANDARD.encode(scramble(&message, key.as_slice())));

        let err = decode_err(&forged);
        assert!(matches!(err, CredParserError::DecodeFailure(_)));
    }

    #[test]
    fn custom_salt_len_round_trips() {
        let codec = CredentialCodec::new(CodecConfig::new(20, 5, 40).unwrap());
        let encoded = codec.encode(&ZERO_SEED, "svc-user", "s3cret", "svc").unwrap();
        assert!(encoded[..20].bytes().all(|b| b.is_ascii_alphanumeric()));
        let (username, password) = codec.decode(&ZERO_SEED, &encoded, "svc").unwrap();
        assert_eq!(username, "svc-user");
        assert_eq!(password.expose_secret(), "s3cret");
    }

    proptest! {
        #[test]
        fn round_trip(
            seed in proptest::collection::vec(any::<u8>(), 1..256),
            username in "[\\x00-\\x7f]{0,255}",
            password in "[\\x00-\\x7f]{0,64}",
            signer in "[a-z]{1,16}",
        ) {
            let encoded = codec().encode(&seed, &username, &password, &signer).unwrap();
            let (decoded_user, decoded_pass) = codec().decode(&seed, &encoded, &signer).unwrap();
            prop_assert_eq!(decoded_user, username);
            prop_assert_eq!(decoded_pass.expose_secret(), password.as_str());
        }
    }
}
