//! Sign-in and registration form validation.

use platform_host::{LoginRequest, RegisterRequest};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Please enter a username and password.")]
    MissingCredentials,
    #[error("Please fill in all fields.")]
    MissingRegistrationFields,
}

/// Builds a login request from raw form input. The username is trimmed; the password is not.
///
/// # Errors
///
/// Returns [`CredentialsError::MissingCredentials`] when either field is empty.
pub fn login_request(username: &str, password: &str) -> Result<LoginRequest, CredentialsError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(CredentialsError::MissingCredentials);
    }
    Ok(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Builds a registration request from raw form input.
///
/// # Errors
///
/// Returns [`CredentialsError::MissingRegistrationFields`] when any field is empty.
pub fn register_request(
    username: &str,
    password: &str,
    email: &str,
) -> Result<RegisterRequest, CredentialsError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || password.is_empty() || email.is_empty() {
        return Err(CredentialsError::MissingRegistrationFields);
    }
    Ok(RegisterRequest {
        username: username.to_string(),
        password: password.to_string(),
        email: email.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn login_trims_username_and_keeps_password() {
        let request = login_request("  ada ", " pw ").expect("valid");
        assert_eq!(request.username, "ada");
        assert_eq!(request.password, " pw ");
    }

    #[test]
    fn blank_login_fields_are_rejected() {
        assert_eq!(
            login_request("   ", "pw"),
            Err(CredentialsError::MissingCredentials)
        );
        assert_eq!(
            login_request("ada", ""),
            Err(CredentialsError::MissingCredentials)
        );
    }

    #[test]
    fn registration_needs_every_field() {
        assert_eq!(
            register_request("ada", "pw", "  "),
            Err(CredentialsError::MissingRegistrationFields)
        );
        let request = register_request(" ada ", "pw", " ada@example.com ").expect("valid");
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.username, "ada");
    }
}
