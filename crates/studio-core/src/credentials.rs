//! Login credentials type.

use std::fmt;

use serde::Serialize;

/// Username and password for the login endpoint.
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use studio_core::Credentials;
///
/// let creds = Credentials::new("alice", "hunter22");
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Clone, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password. Use only when building the login request.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("alice", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn serializes_as_login_body() {
        let creds = Credentials::new("alice", "secret123");
        let body = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "alice", "password": "secret123"})
        );
    }
}
