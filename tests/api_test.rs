//! Router-level tests over mocked services.
//!
//! Exercises route wiring, the token gate, and the flat error
//! envelope without a database connection.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use mockall::predicate::eq;
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use student_registry::api::{create_router, AppState};
use student_registry::domain::{AccountResponse, EnrolledCourse, Role, StudentResponse};
use student_registry::errors::{AppError, AuthFailure};
use student_registry::infra::Database;
use student_registry::services::{
    Claims, LoginResponse, MockAuthService, MockCatalogService, MockEnrollmentService,
    MockStudentService, TokenResponse,
};

struct ServiceMocks {
    auth: MockAuthService,
    students: MockStudentService,
    catalog: MockCatalogService,
    enrollments: MockEnrollmentService,
}

impl ServiceMocks {
    fn new() -> Self {
        Self {
            auth: MockAuthService::new(),
            students: MockStudentService::new(),
            catalog: MockCatalogService::new(),
            enrollments: MockEnrollmentService::new(),
        }
    }

    fn into_router(self) -> Router {
        let connection = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(
            Arc::new(self.auth),
            Arc::new(self.students),
            Arc::new(self.catalog),
            Arc::new(self.enrollments),
            Arc::new(Database::from_connection(connection)),
        );
        create_router(state)
    }
}

fn student_claims() -> Claims {
    Claims {
        sub: "CS2024001".to_string(),
        role: "STUDENT".to_string(),
        exp: Utc::now().timestamp() + 3600,
        iat: Utc::now().timestamp(),
    }
}

fn admin_claims() -> Claims {
    Claims {
        sub: "admin".to_string(),
        role: "ADMIN".to_string(),
        exp: Utc::now().timestamp() + 3600,
        iat: Utc::now().timestamp(),
    }
}

fn sample_account() -> AccountResponse {
    AccountResponse {
        id: Uuid::new_v4(),
        username: "CS2024001".to_string(),
        role: Role::Student,
        first_login: true,
        student_id: Some(Uuid::new_v4()),
        created_at: Utc::now(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_endpoint_is_public() {
    let app = ServiceMocks::new().into_router();

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_is_reachable_without_a_token() {
    let mut mocks = ServiceMocks::new();
    mocks.auth.expect_login().returning(|_, _| {
        Ok(LoginResponse {
            token: TokenResponse {
                access_token: "issued-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 86400,
            },
            account: sample_account(),
        })
    });

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"username": "CS2024001", "password": "123456"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["access_token"], "issued-token");
    assert_eq!(body["data"]["account"]["username"], "CS2024001");
}

#[tokio::test]
async fn protected_routes_reject_requests_without_a_token() {
    let app = ServiceMocks::new().into_router();

    let response = app
        .oneshot(Request::get("/auth/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["message"], "Missing or malformed authentication token");
}

#[tokio::test]
async fn expired_tokens_get_their_own_message() {
    let mut mocks = ServiceMocks::new();
    mocks
        .auth
        .expect_verify_token()
        .returning(|_| Err(AppError::Auth(AuthFailure::Expired)));

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::get("/auth/info")
                .header(header::AUTHORIZATION, "Bearer stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Authentication token has expired");
}

#[tokio::test]
async fn forged_tokens_are_rejected_as_bad_signature() {
    let mut mocks = ServiceMocks::new();
    mocks
        .auth
        .expect_verify_token()
        .returning(|_| Err(AppError::Auth(AuthFailure::BadSignature)));

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::get("/students/me")
                .header(header::AUTHORIZATION, "Bearer forged")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Authentication token signature is invalid");
}

#[tokio::test]
async fn preflight_requests_bypass_the_token_gate() {
    let app = ServiceMocks::new().into_router();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/enrollments/mine")
                .header(header::ORIGIN, "http://localhost:8080")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn valid_tokens_reach_the_handler() {
    let mut mocks = ServiceMocks::new();
    mocks
        .auth
        .expect_verify_token()
        .returning(|_| Ok(student_claims()));
    mocks
        .auth
        .expect_account_info()
        .with(eq("CS2024001"))
        .returning(|_| Ok(sample_account()));

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::get("/auth/info")
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "CS2024001");
    assert_eq!(body["data"]["role"], "STUDENT");
}

#[tokio::test]
async fn admin_routes_reject_student_tokens() {
    let mut mocks = ServiceMocks::new();
    mocks
        .auth
        .expect_verify_token()
        .returning(|_| Ok(student_claims()));

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::get("/students")
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_can_list_another_students_enrollments() {
    let student_id = Uuid::new_v4();
    let major_id = Uuid::new_v4();

    let mut mocks = ServiceMocks::new();
    mocks
        .auth
        .expect_verify_token()
        .returning(|_| Ok(admin_claims()));
    mocks
        .students
        .expect_get_student()
        .with(eq(student_id))
        .returning(move |_| {
            Ok(StudentResponse {
                id: student_id,
                student_id: "CS2024001".to_string(),
                name: "Alice Zhang".to_string(),
                age: 20,
                phone: "13800001111".to_string(),
                enrollment_date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
                major_id,
            })
        });
    mocks
        .enrollments
        .expect_courses_of()
        .with(eq(student_id))
        .returning(|_| {
            Ok(vec![EnrolledCourse {
                enrollment_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
                course_code: "CS101".to_string(),
                course_name: "Introduction to Programming".to_string(),
                credits: Decimal::new(25, 1),
                selected_at: Utc::now(),
            }])
        });

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::get(format!("/enrollments/student/{}", student_id))
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["course_code"], "CS101");
}

#[tokio::test]
async fn registration_is_public_and_returns_created() {
    let mut mocks = ServiceMocks::new();
    mocks.students.expect_register().returning(|registration| {
        Ok(StudentResponse {
            id: Uuid::new_v4(),
            student_id: "CS2024001".to_string(),
            name: registration.name,
            age: registration.age,
            phone: registration.phone,
            enrollment_date: registration.enrollment_date,
            major_id: registration.major_id,
        })
    });

    let app = mocks.into_router();
    let response = app
        .oneshot(
            Request::post("/students/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Alice Zhang",
                        "age": 20,
                        "phone": "13800001111",
                        "enrollment_date": "2024-09-01",
                        "major_id": Uuid::new_v4(),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["student_id"], "CS2024001");
}

#[tokio::test]
async fn validation_failures_use_the_flat_envelope() {
    let app = ServiceMocks::new().into_router();

    // Blank name fails the request-level rules before the service runs
    let response = app
        .oneshot(
            Request::post("/students/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "",
                        "age": 20,
                        "phone": "13800001111",
                        "enrollment_date": "2024-09-01",
                        "major_id": Uuid::new_v4(),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "Name is required");
}
