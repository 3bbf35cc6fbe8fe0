//! Normalized registrant email, the primary key of the registrant store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CheckinError;

/// Registrant email address in canonical form.
///
/// Surrounding whitespace is stripped and the address is lowercased, so
/// `" Jane@X.com "` and `"jane@x.com"` name the same registrant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalizes and validates a raw email address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::InvalidEmail`] if the address is empty after
    /// trimming or does not contain an `@`.
    pub fn parse(raw: &str) -> Result<Self, CheckinError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || !normalized.contains('@') {
            return Err(CheckinError::InvalidEmail(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = CheckinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
