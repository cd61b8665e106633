//! Authentication and password reset wire types.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::ValidationError;

use super::UserSummary;

/// Minimum length enforced locally before a password reset is sent.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The credential pair issued by login and social login.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").field("tokens", &"[REDACTED]").finish()
    }
}

/// Body of a registration request.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

/// The account created by a registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of the social login callback.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLogin {
    pub provider: String,
    pub access_token: String,
}

/// Response to the social login callback.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialLoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Body of a forgot-password request.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPassword {
    pub email: String,
}

impl ForgotPassword {
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "email" }.into());
        }
        Ok(Self { email })
    }
}

/// Response to a forgot-password request.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    /// Direct reset link. Only returned by development backends.
    #[serde(default)]
    pub reset_url: Option<String>,
}

/// Result of checking a reset token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetTokenCheck {
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a password redemption request.
#[derive(Clone, Serialize)]
pub struct ResetPassword {
    token: String,
    new_password: String,
    confirm_password: String,
}

impl ResetPassword {
    /// Validate locally: token present, confirmation matches, minimum length.
    pub fn new(
        token: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        let new_password = new_password.into();
        let confirm_password = confirm_password.into();

        if token.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "token" }.into());
        }
        if new_password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            }
            .into());
        }

        Ok(Self {
            token,
            new_password,
            confirm_password,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for ResetPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPassword")
            .field("token", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

/// A bare `{message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn reset_requires_matching_confirmation() {
        let err = ResetPassword::new("tok", "password1", "password2").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::PasswordMismatch)
        ));
        assert_eq!(err.user_message(), "Passwords don't match");
    }

    #[test]
    fn reset_requires_minimum_length() {
        let err = ResetPassword::new("tok", "short", "short").unwrap_err();
        assert_eq!(
            err.user_message(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn reset_requires_token() {
        let err = ResetPassword::new("", "password1", "password1").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField { field: "token" })
        ));
    }

    #[test]
    fn reset_body_shape() {
        let body = serde_json::to_value(ResetPassword::new("tok", "password1", "password1").unwrap())
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "token": "tok",
                "new_password": "password1",
                "confirm_password": "password1"
            })
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let reset = ResetPassword::new("tok-secret", "password1", "password1").unwrap();
        let debug = format!("{reset:?}");
        assert!(!debug.contains("tok-secret"));
        assert!(!debug.contains("password1"));
    }

    #[test]
    fn forgot_password_requires_email() {
        assert!(ForgotPassword::new(" ").is_err());
        assert_eq!(ForgotPassword::new("a@b.c").unwrap().email, "a@b.c");
    }
}
