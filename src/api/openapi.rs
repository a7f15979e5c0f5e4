//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, course_handler, enrollment_handler, major_handler, student_handler,
};
use crate::domain::{
    AccountResponse, Course, CourseStatistics, EnrolledCourse, Enrollment, Major, Role,
    StudentResponse,
};
use crate::services::{LoginResponse, TokenResponse};

/// OpenAPI documentation for the Student Registry API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student Registry API",
        version = "0.1.0",
        description = "Student enrollment backend: accounts, identifier allocation, catalog, and course selection"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        auth_handler::logout,
        auth_handler::info,
        auth_handler::change_password,
        auth_handler::list_accounts,
        auth_handler::get_account,
        auth_handler::delete_account,
        student_handler::register,
        student_handler::list_students,
        student_handler::my_profile,
        student_handler::get_student,
        student_handler::delete_student,
        major_handler::list_majors,
        major_handler::get_major,
        major_handler::create_major,
        major_handler::update_major,
        major_handler::delete_major,
        course_handler::list_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::delete_course,
        course_handler::students_in_course,
        enrollment_handler::select_course,
        enrollment_handler::drop_course,
        enrollment_handler::student_enrollments,
        enrollment_handler::my_courses,
        enrollment_handler::my_credits,
        enrollment_handler::list_enrollments,
        enrollment_handler::statistics,
    ),
    components(
        schemas(
            Role,
            AccountResponse,
            StudentResponse,
            Major,
            Course,
            Enrollment,
            EnrolledCourse,
            CourseStatistics,
            TokenResponse,
            LoginResponse,
            auth_handler::LoginRequest,
            auth_handler::ChangePasswordRequest,
            student_handler::RegisterStudentRequest,
            major_handler::CreateMajorRequest,
            major_handler::UpdateMajorRequest,
            course_handler::CreateCourseRequest,
            course_handler::UpdateCourseRequest,
            enrollment_handler::CreditsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, logout, and password management"),
        (name = "Accounts", description = "Account administration"),
        (name = "Students", description = "Registration and student administration"),
        (name = "Majors", description = "Major catalog"),
        (name = "Courses", description = "Course catalog"),
        (name = "Enrollments", description = "Course selection and rollups")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
