//! Opaque check-in token embedded in each registrant's QR code.
//!
//! [`CheckinToken`] is a newtype over the token string so that tokens
//! cannot be confused with emails or names. Newly provisioned tokens are
//! UUID v4 strings; tokens arriving from scans are accepted as opaque text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CheckinError;

/// Secondary lookup key for a registrant.
///
/// Generated once at provisioning time and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckinToken(String);

impl CheckinToken {
    /// Creates a new random token (UUID v4, hyphenated).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Validates a token taken from an inbound request.
    ///
    /// Surrounding whitespace (some scanners append a newline) is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::MissingToken`] if the token is absent, empty,
    /// or whitespace only.
    pub fn parse(raw: Option<&str>) -> Result<Self, CheckinError> {
        match raw.map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Self(token.to_string())),
            _ => Err(CheckinError::MissingToken),
        }
    }

    /// Returns the token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
