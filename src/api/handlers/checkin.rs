//! Check-in endpoint hit by scanning a registrant's QR code.

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;

use crate::api::dto::CheckinQuery;
use crate::api::page;
use crate::app_state::AppState;

/// `GET /checkin?token=...` — Check a registrant in.
///
/// Always answers with an HTML page. A malformed query string is treated
/// the same as a missing token.
#[utoipa::path(
    get,
    path = "/checkin",
    tag = "Check-in",
    summary = "Check a registrant in",
    description = "Resolves the token to a registrant and marks them checked in exactly once. Responds with an HTML confirmation page.",
    params(CheckinQuery),
    responses(
        (status = 200, description = "Checked in on this request", content_type = "text/html", body = String),
        (status = 400, description = "Missing token, unknown token, or already checked in", content_type = "text/html", body = String),
        (status = 500, description = "Store failure", content_type = "text/html", body = String),
    )
)]
pub async fn checkin_handler(
    State(state): State<AppState>,
    query: Result<Query<CheckinQuery>, QueryRejection>,
) -> impl IntoResponse {
    let token = query.ok().and_then(|Query(q)| q.token);
    let outcome = state.checkin_service.handle_checkin(token.as_deref()).await;
    page::outcome(&outcome)
}

/// Check-in routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/checkin", get(checkin_handler))
}
