//! Course catalog handlers.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Course, StudentResponse};
use crate::errors::AppResult;
use crate::services::CourseInput;
use crate::types::{ApiResponse, Created};

/// Create-course request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    /// Unique course code
    #[validate(length(min = 1, max = 32, message = "Course code must be 1-32 characters"))]
    #[schema(example = "CS101")]
    pub code: String,
    /// Display name
    #[validate(length(min = 1, message = "Course name is required"))]
    #[schema(example = "Introduction to Programming")]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Credit value
    #[schema(example = 3.0)]
    pub credits: Decimal,
}

/// Update-course request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, message = "Course name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<Decimal>,
}

/// Token-guarded course routes
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/", post(create_course))
        .route("/:id", get(get_course))
        .route("/:id", put(update_course))
        .route("/:id", delete(delete_course))
        .route("/:id/students", get(students_in_course))
}

/// List all courses
#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All courses", body = [Course]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_courses(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Course>>> {
    let courses = state.catalog_service.list_courses().await?;
    Ok(ApiResponse::success(courses))
}

/// Get one course
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 400, description = "Course not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Course>> {
    let course = state.catalog_service.get_course(id).await?;
    Ok(ApiResponse::success(course))
}

/// Create a course (admin)
#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Validation error or duplicate code"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<Created<Course>> {
    require_admin(&user)?;
    let course = state
        .catalog_service
        .create_course(CourseInput {
            code: payload.code,
            name: payload.name,
            description: payload.description,
            credits: payload.credits,
        })
        .await?;

    Ok(Created(course))
}

/// Update a course (admin)
#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Course not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCourseRequest>,
) -> AppResult<ApiResponse<Course>> {
    require_admin(&user)?;
    let course = state
        .catalog_service
        .update_course(id, payload.name, payload.description, payload.credits)
        .await?;

    Ok(ApiResponse::success(course))
}

/// Delete a course (admin); rejected while enrollments reference it
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 400, description = "Course not found or still in use"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&user)?;
    state.catalog_service.delete_course(id).await?;
    Ok(ApiResponse::message("Course deleted"))
}

/// Students enrolled in a course (admin)
#[utoipa::path(
    get,
    path = "/courses/{id}/students",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = [StudentResponse]),
        (status = 400, description = "Course not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn students_in_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<StudentResponse>>> {
    require_admin(&user)?;
    let students = state.enrollment_service.students_in_course(id).await?;
    Ok(ApiResponse::success(students))
}
