//! Business logic services.

pub mod auth_service;
pub mod catalog_service;
pub mod container;
pub mod enrollment_service;
pub mod student_service;

pub use auth_service::{AuthService, Authenticator, Claims, LoginResponse, TokenResponse};
pub use catalog_service::{Catalog, CatalogService, CourseInput, MajorInput};
pub use container::{ServiceContainer, Services};
pub use enrollment_service::{EnrollmentEngine, EnrollmentService};
pub use student_service::{Registrar, StudentRegistration, StudentService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_service::MockCatalogService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_service::MockEnrollmentService;
#[cfg(any(test, feature = "test-utils"))]
pub use student_service::MockStudentService;
