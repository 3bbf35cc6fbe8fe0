//! Registrant store: the durable table keyed by email with a token index.
//!
//! [`RegistrantStore`] is the only shared resource in the service and the
//! sole concurrency-control point. Two implementations are provided:
//! [`PostgresStore`] backed by `sqlx::PgPool`, and [`InMemoryStore`] for
//! local runs and tests. The store is opened once at startup and shared as
//! an `Arc<dyn RegistrantStore>`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CheckinToken, Email, Registrant};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Store-level failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A registrant with this email already exists.
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// Another registrant already holds this token.
    #[error("duplicate token")]
    DuplicateToken,

    /// A stored row could not be decoded into a registrant.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Driver, connection, or migration failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result of the conditional check-in write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinWrite {
    /// The condition held and the record was updated; carries the
    /// post-update record.
    Applied(Registrant),
    /// The record was already checked in; carries the stored record.
    AlreadyCheckedIn(Registrant),
    /// No record exists for the email.
    Missing,
}

/// Durable registrant table with a secondary index on token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Short backend identifier used in logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Inserts a new registrant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] or [`StoreError::DuplicateToken`]
    /// when a uniqueness constraint would be violated, or
    /// [`StoreError::Backend`] on driver failure.
    async fn insert(&self, registrant: &Registrant) -> Result<(), StoreError>;

    /// Fetches a registrant by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on driver failure.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Registrant>, StoreError>;

    /// Queries the token index.
    ///
    /// Returns every match ordered by `created_at`, then `email`. More than
    /// one match indicates an integrity violation that callers must handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on driver failure.
    async fn find_by_token(&self, token: &CheckinToken) -> Result<Vec<Registrant>, StoreError>;

    /// Atomically sets `checked_in` and `checked_in_at` on the record for
    /// `email`, only if it is not checked in yet.
    ///
    /// Only those two fields are written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on driver failure.
    async fn mark_checked_in(
        &self,
        email: &Email,
        at: DateTime<Utc>,
    ) -> Result<CheckinWrite, StoreError>;
}
