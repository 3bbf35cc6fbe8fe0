//! In-process registrant store.
//!
//! [`InMemoryStore`] keeps all registrants in a `HashMap` keyed by email
//! behind a single [`tokio::sync::RwLock`]. The conditional check-in runs
//! under the write lock, so it is atomic with respect to every other
//! operation on the store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CheckinWrite, RegistrantStore, StoreError};
use crate::domain::{CheckinToken, Email, Registrant};

/// Registrant table held in memory. Contents are lost on restart.
///
/// # Concurrency
///
/// - Reads run concurrently.
/// - Inserts and check-ins are serialized.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    registrants: RwLock<HashMap<Email, Registrant>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registrants.
    pub async fn len(&self) -> usize {
        self.registrants.read().await.len()
    }

    /// Returns `true` if the store holds no registrants.
    pub async fn is_empty(&self) -> bool {
        self.registrants.read().await.is_empty()
    }
}

#[async_trait]
impl RegistrantStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, registrant: &Registrant) -> Result<(), StoreError> {
        let mut map = self.registrants.write().await;
        if map.contains_key(&registrant.email) {
            return Err(StoreError::DuplicateEmail(registrant.email.to_string()));
        }
        if map.values().any(|r| r.token == registrant.token) {
            return Err(StoreError::DuplicateToken);
        }
        map.insert(registrant.email.clone(), registrant.clone());
        Ok(())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Registrant>, StoreError> {
        Ok(self.registrants.read().await.get(email).cloned())
    }

    async fn find_by_token(&self, token: &CheckinToken) -> Result<Vec<Registrant>, StoreError> {
        let map = self.registrants.read().await;
        let mut matches: Vec<Registrant> = map
            .values()
            .filter(|r| &r.token == token)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        Ok(matches)
    }

    async fn mark_checked_in(
        &self,
        email: &Email,
        at: DateTime<Utc>,
    ) -> Result<CheckinWrite, StoreError> {
        let mut map = self.registrants.write().await;
        let Some(stored) = map.get_mut(email) else {
            return Ok(CheckinWrite::Missing);
        };
        if stored.checked_in {
            return Ok(CheckinWrite::AlreadyCheckedIn(stored.clone()));
        }
        stored.checked_in = true;
        stored.checked_in_at = Some(at);
        Ok(CheckinWrite::Applied(stored.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn make_registrant(email: &str, token: &str) -> Registrant {
        let Ok(email) = Email::parse(email) else {
            panic!("valid email");
        };
        let Ok(token) = CheckinToken::parse(Some(token)) else {
            panic!("valid token");
        };
        Registrant::new(email, "Test".to_string(), token, Utc::now())
    }

    #[tokio::test]
    async fn insert_and_get_by_email() {
        let store = InMemoryStore::new();
        let r = make_registrant("a@x.com", "T1");
        assert!(store.insert(&r).await.is_ok());

        let fetched = store.get_by_email(&r.email).await;
        let Ok(Some(fetched)) = fetched else {
            panic!("registrant not found");
        };
        assert_eq!(fetched, r);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryStore::new();
        let _ = store.insert(&make_registrant("a@x.com", "T1")).await;
        let result = store.insert(&make_registrant("A@X.com", "T2")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_token() {
        let store = InMemoryStore::new();
        let _ = store.insert(&make_registrant("a@x.com", "T1")).await;
        let result = store.insert(&make_registrant("b@x.com", "T1")).await;
        assert!(matches!(result, Err(StoreError::DuplicateToken)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_by_token_returns_match_or_empty() {
        let store = InMemoryStore::new();
        let r = make_registrant("a@x.com", "T1");
        let _ = store.insert(&r).await;

        let Ok(found) = store.find_by_token(&r.token).await else {
            panic!("query failed");
        };
        assert_eq!(found.len(), 1);

        let Ok(bogus) = CheckinToken::parse(Some("bogus")) else {
            panic!("valid token");
        };
        let Ok(none) = store.find_by_token(&bogus).await else {
            panic!("query failed");
        };
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn mark_checked_in_applies_once() {
        let store = InMemoryStore::new();
        let r = make_registrant("a@x.com", "T1");
        let _ = store.insert(&r).await;

        let first_at = Utc::now();
        let first = store.mark_checked_in(&r.email, first_at).await;
        let Ok(CheckinWrite::Applied(updated)) = first else {
            panic!("expected applied write");
        };
        assert_eq!(updated.checked_in_at, Some(first_at));

        let second = store
            .mark_checked_in(&r.email, first_at + chrono::Duration::seconds(5))
            .await;
        let Ok(CheckinWrite::AlreadyCheckedIn(stored)) = second else {
            panic!("expected already checked in");
        };
        assert_eq!(stored.checked_in_at, Some(first_at));
    }

    #[tokio::test]
    async fn mark_checked_in_missing_email() {
        let store = InMemoryStore::new();
        let Ok(email) = Email::parse("ghost@x.com") else {
            panic!("valid email");
        };
        let result = store.mark_checked_in(&email, Utc::now()).await;
        assert!(matches!(result, Ok(CheckinWrite::Missing)));
    }

    #[tokio::test]
    async fn concurrent_writes_apply_exactly_once() {
        let store = Arc::new(InMemoryStore::new());
        let r = make_registrant("a@x.com", "T1");
        let _ = store.insert(&r).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let email = r.email.clone();
            handles.push(tokio::spawn(async move {
                store.mark_checked_in(&email, Utc::now()).await
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if let Ok(Ok(CheckinWrite::Applied(_))) = handle.await {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
