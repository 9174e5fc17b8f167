// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `CredParser`: a handle owning one credential string.
//!
//! The handle stores only the encoded string. Username and password are
//! decoded on every read, so a seed replaced underneath a live handle shows up
//! as a [`CredParserError::DecodeFailure`] at the next access.

use std::fmt;
use std::path::{Path, PathBuf};

use credparser_config::{CodecConfig, ConfigOverrides, load_and_validate};
use credparser_core::{CredParserError, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::codec::{CredentialCodec, validate_password, validate_username};
use crate::seed::{MasterSeed, default_seed_path};
use crate::signer::resolve_signer;

/// Mask a secret for display, showing only the first and last 4 characters.
///
/// Values shorter than 10 characters are fully masked.
pub fn mask_secret(value: &str) -> String {
    if value.len() < 10 || !value.is_ascii() {
        return "****".to_string();
    }
    let prefix = &value[..4];
    let suffix = &value[value.len() - 4..];
    format!("{prefix}...{suffix}")
}

/// Builder for [`CredParser`].
#[derive(Debug, Default)]
pub struct CredParserBuilder {
    username: Option<String>,
    password: Option<SecretString>,
    credentials: Option<String>,
    seed_path: Option<PathBuf>,
    signer: Option<String>,
    config: Option<CodecConfig>,
}

impl CredParserBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Start from an existing credential string. An empty string is treated
    /// as no string at all.
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        let credentials = credentials.into();
        self.credentials = (!credentials.is_empty()).then_some(credentials);
        self
    }

    /// Master seed location. Defaults to `<home>/.credparser/master.seed`.
    pub fn seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    /// Signer override. Defaults to the OS account name of this process.
    pub fn signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = Some(signer.into());
        self
    }

    /// Codec parameters. Defaults to the configuration resolved from the
    /// default config file, the environment and built-in defaults.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the inputs and build the handle.
    ///
    /// A username/password pair is encoded right away, creating the master
    /// seed if needed. Either way the resulting credential string is decoded
    /// once before the handle is returned.
    pub fn build(self) -> Result<CredParser> {
        let pair = match (self.username, self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => {
                return Err(CredParserError::Usage(
                    "username and password must be either both set or both absent".into(),
                ));
            }
        };
        if pair.is_some() && self.credentials.is_some() {
            return Err(CredParserError::Usage(
                "cannot combine username and password with a credential string".into(),
            ));
        }
        if let Some((username, password)) = &pair {
            validate_username(username)?;
            validate_password(password.expose_secret())?;
        }

        let seed_path = match self.seed_path {
            Some(path) => path,
            None => default_seed_path()?,
        };
        let signer = resolve_signer(self.signer.as_deref())?;
        let config = match self.config {
            Some(config) => config,
            None => load_and_validate(&ConfigOverrides::default(), None)?,
        };

        let mut parser = CredParser {
            credentials: None,
            seed_path,
            signer,
            codec: CredentialCodec::new(config),
        };

        let credentials = match pair {
            Some((username, password)) => {
                debug!("generating credential string from username/password");
                Some(parser.encode(&username, password.expose_secret(), None)?)
            }
            None => self.credentials,
        };

        match credentials {
            Some(credentials) => parser.load(credentials)?,
            None => debug!("initializing empty credential handle"),
        }

        Ok(parser)
    }
}

/// Handle owning at most one credential string plus the context needed to
/// decode it: seed path, signer and codec parameters.
///
/// Not meant for concurrent mutation; wrap it in a lock when sharing.
pub struct CredParser {
    credentials: Option<String>,
    seed_path: PathBuf,
    signer: String,
    codec: CredentialCodec,
}

impl CredParser {
    pub fn builder() -> CredParserBuilder {
        CredParserBuilder::default()
    }

    /// The held credential string, if any.
    pub fn credentials(&self) -> Option<&str> {
        self.credentials.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_none()
    }

    /// Decode the held string and return its username.
    pub fn username(&self) -> Result<Option<String>> {
        Ok(self.decode_held()?.map(|(username, _)| username))
    }

    /// Decode the held string and return its password.
    pub fn password(&self) -> Result<Option<SecretString>> {
        Ok(self.decode_held()?.map(|(_, password)| password))
    }

    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    pub fn config(&self) -> &CodecConfig {
        self.codec.config()
    }

    /// Replace the held credential string after checking that it decodes.
    ///
    /// On failure the previously held string is kept.
    pub fn load(&mut self, credentials: impl Into<String>) -> Result<()> {
        let credentials = credentials.into();
        self.decode(&credentials, None)?;
        debug!(credentials = %mask_secret(&credentials), "credential string validated");
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Rebuild the handle from a new username/password pair.
    ///
    /// The seed path and config carry over; `signer` of `None` keeps the
    /// current signer. The old credential string is discarded, not migrated.
    /// The handle is left untouched when reconstruction fails.
    pub fn reset(&mut self, username: &str, password: &str, signer: Option<&str>) -> Result<()> {
        let fresh = CredParser::builder()
            .username(username)
            .password(password)
            .seed_path(self.seed_path.clone())
            .signer(signer.unwrap_or(&self.signer))
            .config(*self.codec.config())
            .build()?;
        debug!(signer = %fresh.signer, "credential handle reset");
        *self = fresh;
        Ok(())
    }

    /// Encode a pair without touching the held string.
    ///
    /// Creates the master seed when it does not exist yet.
    pub fn encode(&self, username: &str, password: &str, signer: Option<&str>) -> Result<String> {
        validate_username(username)?;
        validate_password(password)?;

        let seed = MasterSeed::open(&self.seed_path, true)?.seed()?;
        self.codec
            .encode(&seed, username, password, signer.unwrap_or(&self.signer))
    }

    /// Decode a credential string without touching the held string.
    ///
    /// A missing master seed is an [`CredParserError::InitFailure`].
    pub fn decode(&self, credentials: &str, signer: Option<&str>) -> Result<(String, SecretString)> {
        let seed = MasterSeed::open(&self.seed_path, false)?.seed()?;
        self.codec
            .decode(&seed, credentials, signer.unwrap_or(&self.signer))
    }

    fn decode_held(&self) -> Result<Option<(String, SecretString)>> {
        self.credentials
            .as_deref()
            .map(|credentials| self.decode(credentials, None))
            .transpose()
    }
}

impl fmt::Debug for CredParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.credentials {
            Some(credentials) => f
                .debug_struct("CredParser")
                .field("credentials", credentials)
                .field("signer", &self.signer)
                .field("seed_path", &self.seed_path)
                .finish(),
            None => f.write_str("CredParser(<uninitialized>)"),
        }
    }
}
