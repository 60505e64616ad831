// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via SPREF_PASSPHRASE or an interactive TTY prompt.

use secrecy::SecretString;
use spref_core::SprefError;

/// The environment variable name for providing the encryption passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "SPREF_PASSPHRASE";

/// Get the encryption passphrase from the environment or an interactive prompt.
///
/// Priority:
/// 1. `SPREF_PASSPHRASE` environment variable (for scripts and services)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, SprefError> {
    if let Some(key) = passphrase_from_env() {
        return Ok(key);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Settings passphrase: ");
        let passphrase = rpassword::read_password()
            .map_err(|e| SprefError::Encryption(format!("failed to read passphrase: {e}")))?;
        if passphrase.is_empty() {
            return Err(SprefError::Encryption("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(SprefError::Encryption(format!(
        "No passphrase provided. Set {PASSPHRASE_ENV_VAR} or run interactively."
    )))
}

fn passphrase_from_env() -> Option<SecretString> {
    match std::env::var(PASSPHRASE_ENV_VAR) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_var_takes_priority() {
        // SAFETY: serialized with the other env-var tests in this module.
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "from-env") };
        let passphrase = get_passphrase().unwrap();
        assert_eq!(passphrase.expose_secret(), "from-env");
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        // SAFETY: serialized with the other env-var tests in this module.
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "") };
        assert!(passphrase_from_env().is_none());
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };
    }
}
