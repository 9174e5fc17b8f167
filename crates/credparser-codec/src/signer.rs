// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signer resolution.
//!
//! The signer is an opaque identity string folded into key derivation. It is
//! resolved here, at the boundary, and threaded explicitly through every
//! codec call so derivation itself never reads process state.

use credparser_core::{CredParserError, Result};

/// Environment variables consulted for the account name, in order.
const USER_ENV_VARS: &[&str] = &["LOGNAME", "USER", "LNAME", "USERNAME"];

/// The explicit signer if given, otherwise the OS account name.
pub fn resolve_signer(explicit: Option<&str>) -> Result<String> {
    match explicit {
        Some(signer) => Ok(signer.to_string()),
        None => current_user(),
    }
}

/// The OS-level account name of the running process.
///
/// Checks `LOGNAME`, `USER`, `LNAME` and `USERNAME`, then falls back to the
/// password database entry for the real uid on Unix.
pub fn current_user() -> Result<String> {
    for var in USER_ENV_VARS {
        if let Ok(value) = std::env::var(var)
            && !value.is_empty()
        {
            return Ok(value);
        }
    }

    #[cfg(unix)]
    {
        if let Some(name) = passwd_user_name() {
            return Ok(name);
        }
    }

    Err(CredParserError::InitFailure(
        "unable to determine the OS account name; supply an explicit signer".to_string(),
    ))
}

#[cfg(unix)]
fn passwd_user_name() -> Option<String> {
    use std::ffi::CStr;

    let mut buf = vec![0 as libc::c_char; 4096];
    // SAFETY: `passwd` is a plain C struct; all-zero is a valid (empty) value
    // that getpwuid_r overwrites on success.
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    // SAFETY: every pointer references a live local buffer of the stated
    // length; getpwuid_r writes only within them.
    let rc = unsafe {
        libc::getpwuid_r(
            libc::getuid(),
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
        return None;
    }

    // SAFETY: on success pw_name points to a NUL-terminated string in `buf`.
    let name = unsafe { CStr::from_ptr(pwd.pw_name) }
        .to_string_lossy()
        .into_owned();
    (!name.is_empty()).then_some(name)
}
