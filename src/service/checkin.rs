//! Check-in service: the `Pending -> Checked` state machine and the
//! per-request orchestration around it.

use std::sync::Arc;

use chrono::Utc;

use super::resolver::{Resolution, TokenResolver};
use crate::domain::{CheckinState, CheckinToken, Outcome, Registrant};
use crate::error::CheckinError;
use crate::store::{CheckinWrite, RegistrantStore};

/// Result of applying the state machine to a resolved registrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// This call performed the transition; carries the stored record.
    CheckedIn(Registrant),
    /// The registrant was already checked in, either before this call or
    /// by a concurrent request that won the conditional write.
    AlreadyCheckedIn(Registrant),
}

/// Orchestration layer for check-in requests.
///
/// Stateless coordinator over the shared [`RegistrantStore`]. Every request
/// follows the pattern: validate token → resolve → inspect state →
/// conditional write → map to [`Outcome`].
#[derive(Clone)]
pub struct CheckinService {
    store: Arc<dyn RegistrantStore>,
    resolver: TokenResolver,
}

impl CheckinService {
    /// Creates a new `CheckinService`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrantStore>) -> Self {
        let resolver = TokenResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }

    /// Returns a reference to the inner [`TokenResolver`].
    #[must_use]
    pub const fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    /// Returns the backend name of the underlying store.
    #[must_use]
    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Transitions a resolved registrant to checked in.
    ///
    /// A registrant that is already checked in is returned as-is without
    /// touching the store. Otherwise a single conditional write sets
    /// `checked_in` and `checked_in_at`; if a concurrent request got there
    /// first, the stored record is reported as already checked in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::RegistrantNotFound`] if the record vanished
    /// between resolution and the write, or [`CheckinError::Store`] on
    /// store failure.
    pub async fn check_in(&self, registrant: &Registrant) -> Result<Transition, CheckinError> {
        if registrant.state() == CheckinState::Checked {
            return Ok(Transition::AlreadyCheckedIn(registrant.clone()));
        }

        match self
            .store
            .mark_checked_in(&registrant.email, Utc::now())
            .await?
        {
            CheckinWrite::Applied(updated) => {
                tracing::info!(email = %updated.email, "registrant checked in");
                Ok(Transition::CheckedIn(updated))
            }
            CheckinWrite::AlreadyCheckedIn(stored) => {
                tracing::info!(email = %stored.email, "lost check-in race to concurrent scan");
                Ok(Transition::AlreadyCheckedIn(stored))
            }
            CheckinWrite::Missing => Err(CheckinError::RegistrantNotFound),
        }
    }

    /// Handles one scan of a QR code.
    ///
    /// Never fails: every path, including store faults, maps to an
    /// [`Outcome`]. Store faults are logged here with full detail.
    pub async fn handle_checkin(&self, raw_token: Option<&str>) -> Outcome {
        let Ok(token) = CheckinToken::parse(raw_token) else {
            tracing::debug!("check-in request without token");
            return Outcome::MissingToken;
        };

        match self.checkin_token(&token).await {
            Ok(outcome) => outcome,
            Err(CheckinError::RegistrantNotFound) => Outcome::RegistrantNotFound,
            Err(err) => {
                tracing::error!(error = %err, "check-in failed");
                Outcome::InternalError(err.to_string())
            }
        }
    }

    async fn checkin_token(&self, token: &CheckinToken) -> Result<Outcome, CheckinError> {
        let registrant = match self.resolver.resolve(token).await? {
            Resolution::Found(registrant) => registrant,
            Resolution::NotFound => {
                tracing::warn!(%token, "token does not match any registrant");
                return Ok(Outcome::RegistrantNotFound);
            }
        };

        Ok(match self.check_in(&registrant).await? {
            Transition::CheckedIn(updated) => Outcome::Success(updated),
            Transition::AlreadyCheckedIn(stored) => {
                tracing::info!(email = %stored.email, "repeat scan");
                Outcome::AlreadyCheckedIn(stored)
            }
        })
    }
}

impl std::fmt::Debug for CheckinService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckinService")
            .field("store", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
