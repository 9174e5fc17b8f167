// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master seed lifecycle: create once, load many times, never mutate.
//!
//! The seed is a blob of random bytes at a filesystem path. Every derived key
//! is rooted in it, so replacing the file invalidates every credential string
//! issued under the old seed. Rotation is deliberately not offered here; it
//! means replacing the file out of band.
//!
//! Creation writes to a private temp file and hard-links it into place, which
//! fails when the target already exists. Two processes racing on an absent
//! seed therefore never clobber each other: the loser loads the winner's seed.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use credparser_core::{CredParserError, Result};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Size of a freshly generated master seed in bytes.
pub const SEED_LEN: usize = 1024;

/// Mode for a seed directory created by this crate.
pub const SEED_DIR_MODE: u32 = 0o700;

/// Mode enforced on the seed file.
pub const SEED_FILE_MODE: u32 = 0o600;

/// Default seed location: `<home>/.credparser/master.seed`.
pub fn default_seed_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".credparser").join("master.seed"))
        .ok_or_else(|| {
            CredParserError::InitFailure("unable to resolve the home directory".to_string())
        })
}

/// Handle to a master seed file known to exist.
#[derive(Debug, Clone)]
pub struct MasterSeed {
    path: PathBuf,
}

impl MasterSeed {
    /// Check whether a seed file exists at `path`.
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Open the seed at `path`.
    ///
    /// An absent seed is created when `allow_init` is set and is an
    /// [`CredParserError::InitFailure`] otherwise. Decoding always opens with
    /// `allow_init = false`.
    pub fn open(path: impl Into<PathBuf>, allow_init: bool) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if !allow_init {
                return Err(CredParserError::InitFailure(format!(
                    "master seed not found at {}",
                    path.display()
                )));
            }
            match Self::create(&path) {
                Ok(seed) => return Ok(seed),
                Err(_) if Self::exists(&path) => {
                    debug!(path = %path.display(), "master seed created concurrently, loading it");
                }
                Err(e) => return Err(e),
            }
        }

        if !Self::exists(&path) {
            return Err(CredParserError::InitFailure(format!(
                "master seed {} is not a regular file",
                path.display()
            )));
        }

        enforce_permissions(&path)?;
        Ok(Self { path })
    }

    /// Create a new seed at `path`. Refuses to overwrite an existing file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            return Err(already_exists(&path));
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_seed_dir(dir)?;
        }

        let blob = generate_seed_bytes()?;
        persist_new(&path, &blob)?;
        enforce_permissions(&path)?;

        info!(path = %path.display(), "master seed created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw seed bytes.
    pub fn seed(&self) -> Result<Zeroizing<Vec<u8>>> {
        let bytes = Zeroizing::new(fs::read(&self.path).map_err(|e| {
            CredParserError::InitFailure(format!(
                "unable to read master seed {}: {e}",
                self.path.display()
            ))
        })?);

        if bytes.is_empty() {
            return Err(CredParserError::InitFailure(format!(
                "master seed {} is empty",
                self.path.display()
            )));
        }

        Ok(bytes)
    }
}

fn already_exists(path: &Path) -> CredParserError {
    CredParserError::InitFailure(format!(
        "master seed already exists at {}; overwriting it would invalidate every issued credential string",
        path.display()
    ))
}

/// Generate a fresh random seed from the system CSPRNG.
fn generate_seed_bytes() -> Result<Zeroizing<Vec<u8>>> {
    let rng = SystemRandom::new();
    let mut blob = Zeroizing::new(vec![0u8; SEED_LEN]);
    rng.fill(blob.as_mut_slice()).map_err(|_| {
        CredParserError::InitFailure("failed to generate random master seed".to_string())
    })?;
    Ok(blob)
}

/// Create the seed directory (and missing ancestors) with mode 0700.
fn create_seed_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(SEED_DIR_MODE);
    }

    builder.create(dir).map_err(|e| {
        CredParserError::InitFailure(format!(
            "unable to create seed directory {}: {e}",
            dir.display()
        ))
    })?;
    debug!(dir = %dir.display(), "seed directory created");
    Ok(())
}

/// Write `blob` to a private temp file next to `path`, then link it into
/// place. The link fails if `path` appeared in the meantime.
fn persist_new(path: &Path, blob: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "master.seed".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.{:016x}.tmp", rand::random::<u64>()));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SEED_FILE_MODE);
    }

    let result = (|| -> io::Result<()> {
        let mut file = options.open(&tmp)?;
        file.write_all(blob)?;
        file.sync_all()?;
        fs::hard_link(&tmp, path)
    })();
    let _ = fs::remove_file(&tmp);

    result.map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            already_exists(path)
        } else {
            CredParserError::InitFailure(format!(
                "unable to write master seed {}: {e}",
                path.display()
            ))
        }
    })
}

/// Restrict the seed file to 0600 and its immediate parent directory to 0700.
///
/// Only the directory holding the seed is touched; higher ancestors may be
/// shared and keep their mode.
fn enforce_permissions(path: &Path) -> Result<()> {
    if let Some(dir) = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty() && d.parent().is_some())
    {
        enforce_mode(dir, SEED_DIR_MODE, "seed directory")?;
    }
    enforce_mode(path, SEED_FILE_MODE, "master seed")
}

#[cfg(unix)]
fn enforce_mode(path: &Path, expected: u32, what: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|e| {
        CredParserError::InitFailure(format!("unable to inspect {what} {}: {e}", path.display()))
    })?;

    let mode = metadata.permissions().mode() & 0o777;
    if mode != expected {
        warn!(
            path = %path.display(),
            mode = %format!("{mode:o}"),
            expected = %format!("{expected:o}"),
            "{what} permissions too open, restricting"
        );
        fs::set_permissions(path, fs::Permissions::from_mode(expected)).map_err(|e| {
            CredParserError::InitFailure(format!(
                "unable to restrict permissions on {what} {}: {e}",
                path.display()
            ))
        })?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn enforce_mode(_path: &Path, _expected: u32, _what: &str) -> Result<()> {
    Ok(())
}
