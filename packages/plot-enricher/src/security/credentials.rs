//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate so search and generation API keys never end up
//! in logs, debug output, or error messages.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use in a request header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Read an optional credential from the environment.
    ///
    /// Unset and blank variables both count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug() {
        let secret = SecretString::new("serper-super-secret-key");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("serper-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_secret_not_in_display() {
        let secret = SecretString::new("serper-super-secret-key");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_expose_works() {
        let secret = SecretString::new("serper-super-secret-key");
        assert_eq!(secret.expose(), "serper-super-secret-key");
    }

    #[test]
    fn test_blank_env_is_absent() {
        std::env::set_var("PLOT_ENRICHER_TEST_BLANK_KEY", "   ");
        assert!(SecretString::from_env("PLOT_ENRICHER_TEST_BLANK_KEY").is_none());
        std::env::remove_var("PLOT_ENRICHER_TEST_BLANK_KEY");
    }
}
