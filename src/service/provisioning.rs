//! Registrant provisioning: token issuance, seeding, and the token export
//! consumed by QR code generation.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{CheckinToken, Email, Registrant};
use crate::error::CheckinError;
use crate::store::{RegistrantStore, StoreError};

/// How many fresh tokens to try when an insert hits a token collision.
const TOKEN_ATTEMPTS: usize = 3;

/// One input row of a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Raw email; normalized on registration.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// A seed entry that could not be registered.
#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    /// Email as given in the seed file.
    pub email: String,
    /// Why registration failed.
    pub reason: String,
}

/// Summary of a seeding run.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    /// Registrants created, in input order.
    pub created: Vec<Registrant>,
    /// Entries that failed; seeding continues past them.
    pub failed: Vec<SeedFailure>,
}

/// One row of the token export handed to QR code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExport {
    /// Normalized email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Check-in token.
    pub token: String,
    /// URL to encode in the QR code.
    pub checkin_url: String,
}

/// Creates registrants with fresh tokens.
#[derive(Clone)]
pub struct ProvisioningService {
    store: Arc<dyn RegistrantStore>,
}

impl ProvisioningService {
    /// Creates a new `ProvisioningService`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrantStore>) -> Self {
        Self { store }
    }

    /// Registers one person with a newly generated token.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::InvalidEmail`] or [`CheckinError::InvalidName`]
    /// on bad input, [`CheckinError::DuplicateRegistrant`] if the email is
    /// already registered, [`CheckinError::Internal`] if no unique token
    /// could be allocated, or [`CheckinError::Store`] on store failure.
    pub async fn register(&self, email: &str, name: &str) -> Result<Registrant, CheckinError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CheckinError::InvalidName(email.to_string()));
        }

        for attempt in 1..=TOKEN_ATTEMPTS {
            let registrant = Registrant::new(
                email.clone(),
                name.to_string(),
                CheckinToken::generate(),
                Utc::now(),
            );
            match self.store.insert(&registrant).await {
                Ok(()) => {
                    tracing::info!(email = %registrant.email, "registrant provisioned");
                    return Ok(registrant);
                }
                Err(StoreError::DuplicateToken) => {
                    tracing::warn!(%email, attempt, "token collision, regenerating");
                }
                Err(StoreError::DuplicateEmail(existing)) => {
                    return Err(CheckinError::DuplicateRegistrant(existing));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CheckinError::Internal(format!(
            "no unique token for {email} after {TOKEN_ATTEMPTS} attempts"
        )))
    }

    /// Registers every entry, continuing past failures.
    pub async fn seed(&self, entries: &[SeedEntry]) -> SeedReport {
        tracing::info!(count = entries.len(), "seeding registrants");
        let mut report = SeedReport::default();
        for entry in entries {
            match self.register(&entry.email, &entry.name).await {
                Ok(registrant) => report.created.push(registrant),
                Err(err) => {
                    tracing::error!(email = %entry.email, error = %err, "seed entry failed");
                    report.failed.push(SeedFailure {
                        email: entry.email.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "seeding finished"
        );
        report
    }
}

impl std::fmt::Debug for ProvisioningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningService")
            .field("store", &self.store.backend_name())
            .finish()
    }
}

/// Builds `<base>/checkin?token=<token>`, keeping any path prefix of
/// `base` (e.g. an API stage name) and replacing any query.
#[must_use]
pub fn checkin_url(base: &Url, token: &CheckinToken) -> Url {
    let mut url = base.clone();
    let path = format!("{}/checkin", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("token", token.as_str());
    url
}

/// Builds export rows for the given registrants.
#[must_use]
pub fn export_tokens(base: &Url, registrants: &[Registrant]) -> Vec<TokenExport> {
    registrants
        .iter()
        .map(|r| TokenExport {
            email: r.email.to_string(),
            name: r.name.clone(),
            token: r.token.to_string(),
            checkin_url: checkin_url(base, &r.token).to_string(),
        })
        .collect()
}

/// Reads a seed file: a JSON array of `{"email": ..., "name": ...}`.
///
/// # Errors
///
/// Returns [`CheckinError::Seed`] if the file cannot be read or parsed.
pub async fn load_seed_file(path: &Path) -> Result<Vec<SeedEntry>, CheckinError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CheckinError::Seed(format!("reading {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CheckinError::Seed(format!("parsing {}: {e}", path.display())))
}

/// Writes export rows as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CheckinError::Seed`] if serialization or the write fails.
pub async fn write_export(path: &Path, rows: &[TokenExport]) -> Result<(), CheckinError> {
    let json = serde_json::to_vec_pretty(rows)
        .map_err(|e| CheckinError::Seed(format!("encoding export: {e}")))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| CheckinError::Seed(format!("writing {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "token export written");
    Ok(())
}
