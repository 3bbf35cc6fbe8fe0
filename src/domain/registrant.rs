//! The registrant record and its check-in state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CheckinToken, Email};

/// Check-in state of a scanned token.
///
/// `Unregistered` has no backing record; it is the state of a token that
/// did not resolve. `Checked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinState {
    /// No registrant matches the token.
    Unregistered,
    /// Registrant exists and has not checked in.
    Pending,
    /// Registrant has checked in.
    Checked,
}

/// A person pre-enrolled for the event.
///
/// Field names serialize in camelCase to match the provisioning export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    /// Normalized email (primary key).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Unique check-in token (immutable).
    pub token: CheckinToken,
    /// Whether the registrant has checked in. Never reverts to `false`.
    pub checked_in: bool,
    /// Provisioning timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Set exactly once, when `checked_in` becomes `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Registrant {
    /// Creates a registrant that has not checked in yet.
    #[must_use]
    pub fn new(email: Email, name: String, token: CheckinToken, created_at: DateTime<Utc>) -> Self {
        Self {
            email,
            name,
            token,
            checked_in: false,
            created_at,
            checked_in_at: None,
        }
    }

    /// Returns the check-in state of this record.
    #[must_use]
    pub const fn state(&self) -> CheckinState {
        if self.checked_in {
            CheckinState::Checked
        } else {
            CheckinState::Pending
        }
    }

    /// Returns a copy of this record transitioned to `Checked` at `at`.
    ///
    /// A record that is already checked in is returned unchanged, so the
    /// original `checked_in_at` is never overwritten.
    #[must_use]
    pub fn with_checked_in(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if !next.checked_in {
            next.checked_in = true;
            next.checked_in_at = Some(at);
        }
        next
    }

    /// Returns `true` if `checked_in` and `checked_in_at` agree.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.checked_in == self.checked_in_at.is_some()
    }
}
