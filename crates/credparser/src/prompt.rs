// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Username and password acquisition for `credparser make`.

use std::io::{BufRead, Write};

use credparser_core::{CredParserError, Result};
use secrecy::SecretString;

/// Read a username from `input`, prompting on stderr when it is a terminal.
///
/// Surrounding whitespace is trimmed. An empty username is rejected.
pub fn read_username(input: &mut impl BufRead, interactive: bool) -> Result<String> {
    if interactive {
        eprint!("Username/Label: ");
        let _ = std::io::stderr().flush();
    }

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| CredParserError::Usage(format!("failed to read username: {e}")))?;

    let username = line.trim().to_string();
    if username.is_empty() {
        return Err(CredParserError::Usage("username cannot be empty".to_string()));
    }
    Ok(username)
}

/// Read a password from the controlling terminal without echo.
///
/// The terminal is used even when stdin is piped, so the username can arrive
/// on stdin while the password is still typed.
pub fn read_password() -> Result<SecretString> {
    eprint!("Password/API Key: ");
    let password = rpassword::read_password()
        .map_err(|e| CredParserError::Usage(format!("failed to read password: {e}")))?;
    check_password(password)
}

fn check_password(password: String) -> Result<SecretString> {
    if password.is_empty() {
        return Err(CredParserError::Usage("password cannot be empty".to_string()));
    }
    Ok(SecretString::from(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn username_is_trimmed() {
        let mut input = Cursor::new("  svc-backup \n");
        assert_eq!(read_username(&mut input, false).unwrap(), "svc-backup");
    }

    #[test]
    fn empty_username_rejected() {
        let mut input = Cursor::new("   \n");
        let err = read_username(&mut input, false).unwrap_err();
        assert!(matches!(err, CredParserError::Usage(_)));

        let mut input = Cursor::new("");
        assert!(read_username(&mut input, false).is_err());
    }

    #[test]
    fn empty_password_rejected() {
        let err = check_password(String::new()).unwrap_err();
        assert!(matches!(err, CredParserError::Usage(_)));
    }
}
