// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reversible credential strings rooted in a locally persisted master seed.
//!
//! A username/password pair is framed, bit-reversed and XORed with a key
//! derived from the master seed, a per-message salt and the signer (by default
//! the OS account name). Only the holder of the same seed file and signer can
//! decode the result. This is obfuscation against casual disclosure of
//! config files, not encryption against an attacker with local access.
//!
//! ```no_run
//! use credparser_codec::CredParser;
//!
//! let parser = CredParser::builder()
//!     .username("svc-backup")
//!     .password("hunter2")
//!     .build()?;
//! println!("{}", parser.credentials().unwrap_or_default());
//! # Ok::<(), credparser_core::CredParserError>(())
//! ```

pub mod cipher;
pub mod codec;
pub mod handle;
pub mod kdf;
pub mod seed;
pub mod signer;

pub use codec::{CredentialCodec, MAX_USERNAME_LEN, generate_salt};
pub use handle::{CredParser, CredParserBuilder, mask_secret};
pub use seed::{MasterSeed, default_seed_path};
pub use signer::{current_user, resolve_signer};
