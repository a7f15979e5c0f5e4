//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_public_routes, auth_routes, course_routes, enrollment_routes, major_routes,
    student_public_routes, student_routes,
};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured.
///
/// Login and student registration stay outside the token gate;
/// everything else under the API prefixes requires a bearer token.
pub fn create_router(state: AppState) -> Router {
    let guard = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(
            "/auth",
            auth_public_routes().merge(auth_routes().route_layer(guard())),
        )
        .nest(
            "/students",
            student_public_routes().merge(student_routes().route_layer(guard())),
        )
        .nest("/majors", major_routes().route_layer(guard()))
        .nest("/courses", course_routes().route_layer(guard()))
        .nest("/enrollments", enrollment_routes().route_layer(guard()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Student Registry API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                error: Some(e.to_string()),
            }),
        ),
    }
}
