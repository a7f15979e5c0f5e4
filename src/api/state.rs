//! Application state - dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AuthService, CatalogService, EnrollmentService, ServiceContainer, Services, StudentService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Student service
    pub student_service: Arc<dyn StudentService>,
    /// Catalog service
    pub catalog_service: Arc<dyn CatalogService>,
    /// Enrollment service
    pub enrollment_service: Arc<dyn EnrollmentService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            student_service: container.students(),
            catalog_service: container.catalog(),
            enrollment_service: container.enrollments(),
            database,
        }
    }

    /// Create application state with manually injected services.
    ///
    /// Used by tests that substitute mock services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        student_service: Arc<dyn StudentService>,
        catalog_service: Arc<dyn CatalogService>,
        enrollment_service: Arc<dyn EnrollmentService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            student_service,
            catalog_service,
            enrollment_service,
            database,
        }
    }
}
