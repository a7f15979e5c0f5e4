//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//!
//! Inserts racing a unique index are the authoritative conflict signal:
//! every store maps `UniqueConstraintViolation` onto the matching
//! business error instead of a generic database failure.

pub(crate) mod entities;

mod account_repository;
mod course_repository;
mod enrollment_repository;
mod major_repository;
mod student_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use course_repository::{CourseRepository, CourseStore};
pub use enrollment_repository::{EnrollmentRepository, EnrollmentStore};
pub use major_repository::{MajorRepository, MajorStore};
pub use student_repository::{StudentRepository, StudentStore};

pub(crate) use student_repository::year_bounds;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::MockCourseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_repository::MockEnrollmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use major_repository::MockMajorRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use student_repository::MockStudentRepository;

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

/// Translate a unique-constraint violation on insert into the business
/// conflict it represents; everything else stays a database error.
pub(crate) fn map_unique_violation(e: DbErr, conflict: AppError) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
        _ => AppError::from(e),
    }
}
