//! Major catalog handlers.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::Major;
use crate::errors::AppResult;
use crate::services::MajorInput;
use crate::types::{ApiResponse, Created};

/// Create-major request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMajorRequest {
    /// Short alphabetic code; becomes the identifier prefix
    #[validate(length(min = 1, max = 16, message = "Major code must be 1-16 characters"))]
    #[schema(example = "CS")]
    pub code: String,
    /// Display name
    #[validate(length(min = 1, message = "Major name is required"))]
    #[schema(example = "Computer Science")]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Update-major request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMajorRequest {
    #[validate(length(min = 1, message = "Major name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Token-guarded major routes
pub fn major_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_majors))
        .route("/", post(create_major))
        .route("/:id", get(get_major))
        .route("/:id", put(update_major))
        .route("/:id", delete(delete_major))
}

/// List all majors
#[utoipa::path(
    get,
    path = "/majors",
    tag = "Majors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All majors", body = [Major]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_majors(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Major>>> {
    let majors = state.catalog_service.list_majors().await?;
    Ok(ApiResponse::success(majors))
}

/// Get one major
#[utoipa::path(
    get,
    path = "/majors/{id}",
    tag = "Majors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Major", body = Major),
        (status = 400, description = "Major not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_major(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Major>> {
    let major = state.catalog_service.get_major(id).await?;
    Ok(ApiResponse::success(major))
}

/// Create a major (admin)
#[utoipa::path(
    post,
    path = "/majors",
    tag = "Majors",
    security(("bearer_auth" = [])),
    request_body = CreateMajorRequest,
    responses(
        (status = 201, description = "Major created", body = Major),
        (status = 400, description = "Validation error or duplicate code"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_major(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateMajorRequest>,
) -> AppResult<Created<Major>> {
    require_admin(&user)?;
    let major = state
        .catalog_service
        .create_major(MajorInput {
            code: payload.code,
            name: payload.name,
            description: payload.description,
        })
        .await?;

    Ok(Created(major))
}

/// Update a major (admin)
#[utoipa::path(
    put,
    path = "/majors/{id}",
    tag = "Majors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Major ID")),
    request_body = UpdateMajorRequest,
    responses(
        (status = 200, description = "Major updated", body = Major),
        (status = 400, description = "Major not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_major(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateMajorRequest>,
) -> AppResult<ApiResponse<Major>> {
    require_admin(&user)?;
    let major = state
        .catalog_service
        .update_major(id, payload.name, payload.description)
        .await?;

    Ok(ApiResponse::success(major))
}

/// Delete a major (admin); rejected while students are attached
#[utoipa::path(
    delete,
    path = "/majors/{id}",
    tag = "Majors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Major deleted"),
        (status = 400, description = "Major not found or still in use"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_major(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&user)?;
    state.catalog_service.delete_major(id).await?;
    Ok(ApiResponse::message("Major deleted"))
}
