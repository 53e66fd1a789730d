//! Authentication error types.

use thiserror::Error;

use lookoot_core::ValidationError;

use crate::db::RepositoryError;

/// Error codes reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    WeakPassword,
    InvalidEmail,
    EmailAlreadyInUse,
    WrongPassword,
    UserNotFound,
    /// Any code this client has no dedicated message for.
    Other(String),
}

impl AuthErrorCode {
    /// Parse a provider code such as `ERROR_WRONG_PASSWORD`.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "ERROR_WEAK_PASSWORD" => Self::WeakPassword,
            "ERROR_INVALID_EMAIL" => Self::InvalidEmail,
            "ERROR_EMAIL_ALREADY_IN_USE" => Self::EmailAlreadyInUse,
            "ERROR_WRONG_PASSWORD" => Self::WrongPassword,
            "ERROR_USER_NOT_FOUND" => Self::UserNotFound,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::WeakPassword => "ERROR_WEAK_PASSWORD",
            Self::InvalidEmail => "ERROR_INVALID_EMAIL",
            Self::EmailAlreadyInUse => "ERROR_EMAIL_ALREADY_IN_USE",
            Self::WrongPassword => "ERROR_WRONG_PASSWORD",
            Self::UserNotFound => "ERROR_USER_NOT_FOUND",
            Self::Other(code) => code,
        }
    }

    /// User-facing message for this code.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::WeakPassword => "The password is too weak.",
            Self::InvalidEmail => "The email address is badly formatted.",
            Self::EmailAlreadyInUse => "The email address is already in use by another account.",
            Self::WrongPassword => "The password is incorrect.",
            Self::UserNotFound => "There is no user account with this email.",
            Self::Other(_) => "Authentication failed",
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing message for a raw provider error code.
#[must_use]
pub fn auth_error_message(code: &str) -> &'static str {
    AuthErrorCode::parse(code).message()
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the request.
    #[error("authentication provider error: {0}")]
    Provider(AuthErrorCode),

    /// Re-authentication resolved to a different account.
    #[error("credentials belong to a different account")]
    AccountMismatch,

    /// Input failed validation before reaching the provider.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Repository error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message suitable for showing to the person signing in.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(code) => code.message().to_owned(),
            Self::AccountMismatch => AuthErrorCode::WrongPassword.message().to_owned(),
            Self::Validation(err) => err.to_string(),
            Self::Repository(RepositoryError::NotFound) => {
                "Your profile could not be found.".to_owned()
            }
            Self::Repository(_) | Self::PasswordHash => "Authentication failed".to_owned(),
        }
    }
}

impl From<AuthErrorCode> for AuthError {
    fn from(code: AuthErrorCode) -> Self {
        Self::Provider(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            auth_error_message("ERROR_WEAK_PASSWORD"),
            "The password is too weak."
        );
        assert_eq!(
            auth_error_message("ERROR_EMAIL_ALREADY_IN_USE"),
            "The email address is already in use by another account."
        );
        assert_eq!(
            auth_error_message("ERROR_USER_NOT_FOUND"),
            "There is no user account with this email."
        );
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(auth_error_message("ERROR_TOO_MANY_REQUESTS"), "Authentication failed");
        assert_eq!(
            AuthErrorCode::parse("ERROR_TOO_MANY_REQUESTS").as_str(),
            "ERROR_TOO_MANY_REQUESTS"
        );
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AuthError::Repository(RepositoryError::DataCorruption("bad doc".into()));
        assert_eq!(err.user_message(), "Authentication failed");
        let err = AuthError::Provider(AuthErrorCode::WrongPassword);
        assert_eq!(err.user_message(), "The password is incorrect.");
    }
}
