//! HTTP layer: route handlers, DTOs, the HTML page, and router composition.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod page;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete router with all endpoints.
///
/// With the `swagger-ui` feature, Swagger UI is served at `/swagger-ui`
/// and the OpenAPI document at `/api-docs/openapi.json`.
pub fn build_router() -> Router<AppState> {
    let router = handlers::routes();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
