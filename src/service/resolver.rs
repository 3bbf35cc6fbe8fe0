//! Token resolution against the store's token index.

use std::sync::Arc;

use crate::domain::{CheckinState, CheckinToken, Registrant};
use crate::error::CheckinError;
use crate::store::RegistrantStore;

/// Result of resolving a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one registrant (or the first of several) holds the token.
    Found(Registrant),
    /// No registrant holds the token.
    NotFound,
}

impl Resolution {
    /// Returns the check-in state the token resolved to.
    #[must_use]
    pub const fn state(&self) -> CheckinState {
        match self {
            Self::Found(registrant) => registrant.state(),
            Self::NotFound => CheckinState::Unregistered,
        }
    }
}

/// Resolves opaque tokens to registrants. Has no side effects.
#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn RegistrantStore>,
}

impl TokenResolver {
    /// Creates a resolver over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrantStore>) -> Self {
        Self { store }
    }

    /// Looks up the registrant holding `token`.
    ///
    /// Tokens are unique by construction, but the index query may still
    /// return several rows if that was violated out of band. In that case
    /// the first row in store order is returned and the anomaly is logged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Store`] if the index query fails.
    pub async fn resolve(&self, token: &CheckinToken) -> Result<Resolution, CheckinError> {
        let matches = self.store.find_by_token(token).await?;
        let count = matches.len();
        let Some(first) = matches.into_iter().next() else {
            return Ok(Resolution::NotFound);
        };
        if count > 1 {
            tracing::warn!(
                matches = count,
                chosen = %first.email,
                "token resolves to more than one registrant"
            );
        }
        Ok(Resolution::Found(first))
    }
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("store", &self.store.backend_name())
            .finish()
    }
}
