// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for facade-level tests.
//!
//! `TestHarness` owns a temp directory holding the master seed, a fixed signer
//! and a fixed codec config. `parser_builder()` hands out a
//! [`CredParserBuilder`] already pointed at all three.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use credparser_codec::{CredParser, CredParserBuilder};
use credparser_config::CodecConfig;
use credparser_core::{CredParserError, Result};

/// Length of the all-zero seed fixture.
pub const ZERO_SEED_LEN: usize = 1024;

const DEFAULT_SIGNER: &str = "svc";

#[derive(Debug, Clone)]
enum SeedFixture {
    Absent,
    Bytes(Vec<u8>),
}

/// Builder for creating test environments with configurable options.
#[derive(Debug)]
pub struct TestHarnessBuilder {
    seed: SeedFixture,
    signer: String,
    config: CodecConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            seed: SeedFixture::Bytes(vec![0u8; ZERO_SEED_LEN]),
            signer: DEFAULT_SIGNER.to_string(),
            config: CodecConfig::default(),
        }
    }

    /// Pre-create a seed of 1024 zero bytes (the default).
    pub fn with_zero_seed(mut self) -> Self {
        self.seed = SeedFixture::Bytes(vec![0u8; ZERO_SEED_LEN]);
        self
    }

    /// Pre-create a seed with the given bytes.
    pub fn with_seed_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.seed = SeedFixture::Bytes(bytes.into());
        self
    }

    /// Leave the seed path empty so the code under test has to create it.
    pub fn without_seed(mut self) -> Self {
        self.seed = SeedFixture::Absent;
        self
    }

    /// Signer used by handles built from this harness. Defaults to `svc`.
    pub fn with_signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = signer.into();
        self
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the harness, writing the seed fixture into a fresh temp dir.
    pub fn build(self) -> Result<TestHarness> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| {
            CredParserError::InitFailure(format!("failed to create temp dir: {e}"))
        })?;
        let seed_path = temp_dir.path().join("seed").join("master.seed");

        let harness = TestHarness {
            seed_path,
            signer: self.signer,
            config: self.config,
            temp_dir,
        };

        if let SeedFixture::Bytes(bytes) = &self.seed {
            harness.write_seed(bytes)?;
        }

        Ok(harness)
    }
}

/// An isolated CredParser environment, removed on drop.
#[derive(Debug)]
pub struct TestHarness {
    seed_path: PathBuf,
    signer: String,
    config: CodecConfig,
    /// Temp directory kept alive for cleanup on drop.
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Root of the temp directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A builder with seed path, signer and config already set.
    pub fn parser_builder(&self) -> CredParserBuilder {
        CredParser::builder()
            .seed_path(&self.seed_path)
            .signer(&self.signer)
            .config(self.config)
    }

    /// An empty handle bound to this harness.
    pub fn parser(&self) -> Result<CredParser> {
        self.parser_builder().build()
    }

    /// Overwrite the seed file, simulating an out-of-band rotation.
    pub fn replace_seed(&self, bytes: &[u8]) -> Result<()> {
        if self.seed_path.exists() {
            fs::remove_file(&self.seed_path).map_err(|e| {
                CredParserError::InitFailure(format!("failed to remove seed fixture: {e}"))
            })?;
        }
        self.write_seed(bytes)
    }

    /// Delete the seed file.
    pub fn remove_seed(&self) -> Result<()> {
        fs::remove_file(&self.seed_path)
            .map_err(|e| CredParserError::InitFailure(format!("failed to remove seed fixture: {e}")))
    }

    fn write_seed(&self, bytes: &[u8]) -> Result<()> {
        let to_init = |e: std::io::Error| {
            CredParserError::InitFailure(format!("failed to write seed fixture: {e}"))
        };

        if let Some(dir) = self.seed_path.parent() {
            fs::create_dir_all(dir).map_err(to_init)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.seed_path).map_err(to_init)?;
        file.write_all(bytes).map_err(to_init)?;

        tracing::debug!(path = %self.seed_path.display(), len = bytes.len(), "seed fixture written");
        Ok(())
    }
}
