//! Enrollment handlers.
//!
//! Students act on their own enrollments; the acting student is
//! resolved from the verified token subject, never from the request
//! body. Admin views live under the same prefix.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CourseStatistics, EnrolledCourse, Enrollment};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Credit rollup for one student
#[derive(Debug, Serialize, ToSchema)]
pub struct CreditsResponse {
    /// Sum of credits over current enrollments; zero when none
    #[schema(example = 12.5)]
    pub total: Decimal,
}

/// Token-guarded enrollment routes
pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments))
        .route("/statistics", get(statistics))
        .route("/student/:student_id", get(student_enrollments))
        .route("/mine", get(my_courses))
        .route("/credits", get(my_credits))
        .route("/:course_id", post(select_course))
        .route("/:course_id", delete(drop_course))
}

async fn current_student_id(state: &AppState, user: &CurrentUser) -> AppResult<Uuid> {
    let student = state
        .student_service
        .get_by_identifier(&user.username)
        .await?;
    Ok(student.id)
}

/// Enroll the authenticated student in a course
#[utoipa::path(
    post,
    path = "/enrollments/{course_id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Course selected", body = Enrollment),
        (status = 400, description = "Unknown course or already enrolled"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn select_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Created<Enrollment>> {
    let student_id = current_student_id(&state, &user).await?;
    let enrollment = state
        .enrollment_service
        .select_course(student_id, course_id)
        .await?;

    Ok(Created(enrollment))
}

/// Withdraw the authenticated student from a course
#[utoipa::path(
    delete,
    path = "/enrollments/{course_id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course dropped"),
        (status = 400, description = "Not enrolled in this course"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn drop_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    let student_id = current_student_id(&state, &user).await?;
    state
        .enrollment_service
        .drop_course(student_id, course_id)
        .await?;

    Ok(ApiResponse::message("Course dropped"))
}

/// Enrolled courses of an arbitrary student (admin)
#[utoipa::path(
    get,
    path = "/enrollments/student/{student_id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Courses the student is enrolled in", body = [EnrolledCourse]),
        (status = 400, description = "Unknown student or insufficient privileges"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn student_enrollments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(student_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<EnrolledCourse>>> {
    require_admin(&user)?;
    state.student_service.get_student(student_id).await?;
    let courses = state.enrollment_service.courses_of(student_id).await?;
    Ok(ApiResponse::success(courses))
}

/// Courses the authenticated student is enrolled in
#[utoipa::path(
    get,
    path = "/enrollments/mine",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrolled courses", body = [EnrolledCourse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<EnrolledCourse>>> {
    let student_id = current_student_id(&state, &user).await?;
    let courses = state.enrollment_service.courses_of(student_id).await?;
    Ok(ApiResponse::success(courses))
}

/// Credit total for the authenticated student
#[utoipa::path(
    get,
    path = "/enrollments/credits",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Credit total", body = CreditsResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_credits(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<CreditsResponse>> {
    let student_id = current_student_id(&state, &user).await?;
    let total = state.enrollment_service.total_credits(student_id).await?;
    Ok(ApiResponse::success(CreditsResponse { total }))
}

/// All enrollment records (admin)
#[utoipa::path(
    get,
    path = "/enrollments",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All enrollments", body = [Enrollment]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Enrollment>>> {
    require_admin(&user)?;
    let enrollments = state.enrollment_service.list_all().await?;
    Ok(ApiResponse::success(enrollments))
}

/// Per-course enrollment counts (admin)
#[utoipa::path(
    get,
    path = "/enrollments/statistics",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment counts per course", body = [CourseStatistics]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn statistics(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CourseStatistics>>> {
    require_admin(&user)?;
    let stats = state.enrollment_service.statistics().await?;
    Ok(ApiResponse::success(stats))
}
