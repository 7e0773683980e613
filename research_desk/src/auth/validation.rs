//! Input validation applied at the service boundary.
//!
//! Every check returns [`AuthError::Validation`] with a short message that is
//! safe to show to the client.

use super::errors::{AuthError, AuthResult};

/// Maximum username length in characters.
pub const MAX_USERNAME_CHARS: usize = 64;

/// Maximum email length in characters.
pub const MAX_EMAIL_CHARS: usize = 254;

/// Maximum password length in bytes; bounds the work done by the hasher.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Validate a username and return it trimmed.
pub fn validate_username(username: &str) -> AuthResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::Validation("Username is required".to_string()));
    }

    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AuthError::Validation(format!(
            "Username must be at most {MAX_USERNAME_CHARS} characters"
        )));
    }

    if username.chars().any(char::is_control) {
        return Err(AuthError::Validation(
            "Username cannot contain control characters".to_string(),
        ));
    }

    Ok(username.to_string())
}

/// Validate an email address and return its normalized (trimmed, lower-case) form.
pub fn validate_email(email: &str) -> AuthResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }

    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err(AuthError::Validation(format!(
            "Email must be at most {MAX_EMAIL_CHARS} characters"
        )));
    }

    let valid_shape = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid_shape {
        return Err(AuthError::Validation("Email address is invalid".to_string()));
    }

    Ok(email.to_lowercase())
}

/// Validate a password. Passwords are never trimmed.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.trim().is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(())
}

/// Validate a password presented at login.
///
/// Only emptiness and the byte bound are checked, so a whitespace-only
/// password reaches the credential check like any other wrong password.
pub fn validate_login_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(())
}
