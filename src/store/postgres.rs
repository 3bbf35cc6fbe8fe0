//! PostgreSQL implementation of the registrant store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{CheckinWrite, RegistrantStore, StoreError};
use crate::config::CheckinConfig;
use crate::domain::{CheckinToken, Email, Registrant};

/// Raw `registrants` row as selected by every query in this module.
type RegistrantRow = (
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

const COLUMNS: &str = "email, name, token, checked_in, created_at, checked_in_at";

/// Constraint names from `migrations/`, used to classify unique violations.
const EMAIL_CONSTRAINT: &str = "registrants_pkey";
const TOKEN_CONSTRAINT: &str = "registrants_token_idx";

/// PostgreSQL-backed registrant store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from configuration and applies the embedded
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &CheckinConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "postgres store ready"
        );
        Ok(Self::new(pool))
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RegistrantStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, registrant: &Registrant) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO registrants (email, name, token, checked_in, created_at, checked_in_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(registrant.email.as_str())
        .bind(&registrant.name)
        .bind(registrant.token.as_str())
        .bind(registrant.checked_in)
        .bind(registrant.created_at)
        .bind(registrant.checked_in_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &registrant.email))?;

        Ok(())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Registrant>, StoreError> {
        let row = sqlx::query_as::<_, RegistrantRow>(&format!(
            "SELECT {COLUMNS} FROM registrants WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(registrant_from_row).transpose()
    }

    async fn find_by_token(&self, token: &CheckinToken) -> Result<Vec<Registrant>, StoreError> {
        let rows = sqlx::query_as::<_, RegistrantRow>(&format!(
            "SELECT {COLUMNS} FROM registrants WHERE token = $1 ORDER BY created_at, email"
        ))
        .bind(token.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(registrant_from_row).collect()
    }

    async fn mark_checked_in(
        &self,
        email: &Email,
        at: DateTime<Utc>,
    ) -> Result<CheckinWrite, StoreError> {
        let updated = sqlx::query_as::<_, RegistrantRow>(&format!(
            "UPDATE registrants SET checked_in = TRUE, checked_in_at = $2 \
             WHERE email = $1 AND checked_in = FALSE RETURNING {COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Some(row) = updated {
            return Ok(CheckinWrite::Applied(registrant_from_row(row)?));
        }

        // The condition failed: either the row is gone or another writer
        // got there first.
        match self.get_by_email(email).await? {
            None => Ok(CheckinWrite::Missing),
            Some(stored) if stored.checked_in => Ok(CheckinWrite::AlreadyCheckedIn(stored)),
            Some(_) => Err(StoreError::Backend(format!(
                "conditional check-in for {email} matched no row"
            ))),
        }
    }
}

/// Decodes a selected row, re-validating the key columns.
fn registrant_from_row(row: RegistrantRow) -> Result<Registrant, StoreError> {
    let (email, name, token, checked_in, created_at, checked_in_at) = row;
    let email = Email::parse(&email).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let token = CheckinToken::parse(Some(&token))
        .map_err(|_| StoreError::Corrupt(format!("blank token for {email}")))?;
    let registrant = Registrant {
        email,
        name,
        token,
        checked_in,
        created_at,
        checked_in_at,
    };
    if !registrant.is_consistent() {
        tracing::warn!(
            email = %registrant.email,
            checked_in = registrant.checked_in,
            "checked_in and checked_in_at disagree"
        );
    }
    Ok(registrant)
}

fn map_insert_error(err: sqlx::Error, email: &Email) -> StoreError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return match db.constraint() {
            Some(TOKEN_CONSTRAINT) => StoreError::DuplicateToken,
            Some(EMAIL_CONSTRAINT) | None => StoreError::DuplicateEmail(email.to_string()),
            Some(other) => StoreError::Backend(format!("unique violation on {other}")),
        };
    }
    StoreError::Backend(err.to_string())
}
