//! End-to-end tests of the HTTP surface against the in-memory store.

#![allow(clippy::panic, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use tower::ServiceExt;

use checkin_gateway::app_state::AppState;
use checkin_gateway::domain::{CheckinToken, Email, Registrant};
use checkin_gateway::service::{CheckinService, ProvisioningService};
use checkin_gateway::store::{CheckinWrite, InMemoryStore, RegistrantStore, StoreError};

struct Fixture {
    app: Router,
    store: Arc<InMemoryStore>,
}

async fn fixture(people: &[(&str, &str)]) -> (Fixture, Vec<Registrant>) {
    let store = Arc::new(InMemoryStore::new());
    let shared: Arc<dyn RegistrantStore> = Arc::clone(&store) as Arc<dyn RegistrantStore>;

    let provisioning = ProvisioningService::new(Arc::clone(&shared));
    let mut registrants = Vec::new();
    for (email, name) in people {
        let Ok(r) = provisioning.register(email, name).await else {
            panic!("provisioning {email} failed");
        };
        registrants.push(r);
    }

    let app = checkin_gateway::build_app(
        AppState::new(CheckinService::new(shared)),
        Duration::from_secs(5),
    );
    (Fixture { app, store }, registrants)
}

/// Store whose token lookup hangs far longer than any request timeout.
#[derive(Debug)]
struct StalledStore;

#[async_trait]
impl RegistrantStore for StalledStore {
    fn backend_name(&self) -> &'static str {
        "stalled"
    }

    async fn insert(&self, _registrant: &Registrant) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_by_email(&self, _email: &Email) -> Result<Option<Registrant>, StoreError> {
        Ok(None)
    }

    async fn find_by_token(&self, _token: &CheckinToken) -> Result<Vec<Registrant>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    async fn mark_checked_in(
        &self,
        _email: &Email,
        _at: DateTime<Utc>,
    ) -> Result<CheckinWrite, StoreError> {
        Ok(CheckinWrite::Missing)
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
        panic!("bad request");
    };
    let Ok(response) = app.clone().oneshot(request).await;
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn scan_checks_in_then_reports_repeat() {
    let (fx, registrants) = fixture(&[("Jane@X.com", "Jane")]).await;
    let Some(jane) = registrants.first() else {
        panic!("no registrant");
    };
    let uri = format!("/checkin?token={}", jane.token);

    let (status, body) = get(&fx.app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Welcome to the event!"));
    assert!(body.contains("jane@x.com"));

    let Ok(Some(stored)) = fx.store.get_by_email(&jane.email).await else {
        panic!("registrant missing");
    };
    assert!(stored.checked_in);
    let Some(first_at) = stored.checked_in_at else {
        panic!("checked_in_at not set");
    };

    let (status, body) = get(&fx.app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Already checked in!"));

    let Ok(Some(after)) = fx.store.get_by_email(&jane.email).await else {
        panic!("registrant missing");
    };
    assert_eq!(after.checked_in_at, Some(first_at));
}

#[tokio::test]
async fn missing_and_blank_tokens_are_rejected() {
    let (fx, _) = fixture(&[]).await;

    for uri in ["/checkin", "/checkin?token=", "/checkin?token=%20%20"] {
        let (status, body) = get(&fx.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.contains("Missing token"), "{uri}");
    }
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (fx, _) = fixture(&[("a@x.com", "A")]).await;

    let (status, body) = get(&fx.app, "/checkin?token=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Registrant not found"));
    assert_eq!(fx.store.len().await, 1);
}

#[tokio::test]
async fn concurrent_scans_check_in_exactly_once() {
    let (fx, registrants) = fixture(&[("a@x.com", "A"), ("b@x.com", "B")]).await;
    let Some(a) = registrants.first() else {
        panic!("no registrant");
    };
    let uri = format!("/checkin?token={}", a.token);

    let mut handles = Vec::new();
    for _ in 0..24 {
        let app = fx.app.clone();
        let uri = uri.clone();
        handles.push(tokio::spawn(async move { get(&app, &uri).await.0 }));
    }

    let mut ok = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await {
            Ok(StatusCode::OK) => ok += 1,
            Ok(StatusCode::BAD_REQUEST) => rejected += 1,
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(rejected, 23);

    // The other registrant is untouched.
    let Some(b) = registrants.get(1) else {
        panic!("no second registrant");
    };
    let Ok(Some(b_stored)) = fx.store.get_by_email(&b.email).await else {
        panic!("registrant missing");
    };
    assert!(!b_stored.checked_in);
}

#[tokio::test]
async fn health_reports_store_backend() {
    let (fx, _) = fixture(&[]).await;

    let (status, body) = get(&fx.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) else {
        panic!("health body is not JSON");
    };
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("healthy"));
    assert_eq!(json.get("store").and_then(|v| v.as_str()), Some("memory"));
}

#[tokio::test]
async fn slow_store_times_out_with_html_page() {
    let app = checkin_gateway::build_app(
        AppState::new(CheckinService::new(Arc::new(StalledStore))),
        Duration::from_millis(50),
    );

    let Ok(request) = Request::builder()
        .uri("/checkin?token=T1")
        .body(Body::empty())
    else {
        panic!("bad request");
    };
    let Ok(response) = app.oneshot(request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));

    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("Check-in Failed"));
    assert!(body.contains("Please contact staff"));
    assert!(!body.contains("timed out"));
}
