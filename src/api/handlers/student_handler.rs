//! Student handlers.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::StudentResponse;
use crate::errors::AppResult;
use crate::services::StudentRegistration;
use crate::types::{ApiResponse, Created};

/// Student registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterStudentRequest {
    /// Full name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Alice Zhang")]
    pub name: String,
    /// Age in years
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    #[schema(example = 20)]
    pub age: i32,
    /// Contact phone number; must be unique
    #[validate(length(min = 5, max = 20, message = "Phone number must be 5-20 characters"))]
    #[schema(example = "13800001111")]
    pub phone: String,
    /// Enrollment date; its year scopes identifier allocation
    #[schema(example = "2024-09-01")]
    pub enrollment_date: NaiveDate,
    /// Major the student enrolls into
    pub major_id: Uuid,
}

/// Registration route, reachable without a token
pub fn student_public_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// Token-guarded student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students))
        .route("/me", get(my_profile))
        .route("/:id", get(get_student))
        .route("/:id", delete(delete_student))
}

/// Register a new student.
///
/// Allocates the student identifier and seeds a login under the
/// default password.
#[utoipa::path(
    post,
    path = "/students/register",
    tag = "Students",
    request_body = RegisterStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentResponse),
        (status = 400, description = "Duplicate phone, unknown major, or exhausted sequence")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterStudentRequest>,
) -> AppResult<Created<StudentResponse>> {
    let student = state
        .student_service
        .register(StudentRegistration {
            name: payload.name,
            age: payload.age,
            phone: payload.phone,
            enrollment_date: payload.enrollment_date,
            major_id: payload.major_id,
        })
        .await?;

    Ok(Created(student))
}

/// List all students (admin)
#[utoipa::path(
    get,
    path = "/students",
    tag = "Students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All students", body = [StudentResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<StudentResponse>>> {
    require_admin(&user)?;
    let students = state.student_service.list_students().await?;
    Ok(ApiResponse::success(students))
}

/// Profile of the authenticated student
#[utoipa::path(
    get,
    path = "/students/me",
    tag = "Students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student profile", body = StudentResponse),
        (status = 400, description = "No student record for this account"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<StudentResponse>> {
    let student = state
        .student_service
        .get_by_identifier(&user.username)
        .await?;

    Ok(ApiResponse::success(student))
}

/// Get one student (admin)
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 400, description = "Student not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<StudentResponse>> {
    require_admin(&user)?;
    let student = state.student_service.get_student(id).await?;
    Ok(ApiResponse::success(student))
}

/// Delete a student (admin); rejected while enrollments remain
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 400, description = "Student not found or still enrolled"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&user)?;
    state.student_service.delete_student(id).await?;
    Ok(ApiResponse::message("Student deleted"))
}
