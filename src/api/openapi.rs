//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::dto::HealthResponse;
use crate::api::handlers::{checkin, system};

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "checkin-gateway",
        description = "QR-code event check-in service"
    ),
    paths(checkin::checkin_handler, system::health_handler),
    components(schemas(HealthResponse)),
    tags(
        (name = "Check-in", description = "Registrant check-in"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;
