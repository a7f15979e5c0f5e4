//! Service container - centralized service access.

use std::sync::Arc;

use super::{AuthService, CatalogService, EnrollmentService, StudentService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get student service
    fn students(&self) -> Arc<dyn StudentService>;

    /// Get catalog service
    fn catalog(&self) -> Arc<dyn CatalogService>;

    /// Get enrollment service
    fn enrollments(&self) -> Arc<dyn EnrollmentService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    student_service: Arc<dyn StudentService>,
    catalog_service: Arc<dyn CatalogService>,
    enrollment_service: Arc<dyn EnrollmentService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        student_service: Arc<dyn StudentService>,
        catalog_service: Arc<dyn CatalogService>,
        enrollment_service: Arc<dyn EnrollmentService>,
    ) -> Self {
        Self {
            auth_service,
            student_service,
            catalog_service,
            enrollment_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: impl Into<Arc<sea_orm::DatabaseConnection>>,
        config: Config,
    ) -> Self {
        use super::{Authenticator, Catalog, EnrollmentEngine, Registrar};

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let student_service = Arc::new(Registrar::new(uow.clone()));
        let catalog_service = Arc::new(Catalog::new(uow.clone()));
        let enrollment_service = Arc::new(EnrollmentEngine::new(uow));

        Self {
            auth_service,
            student_service,
            catalog_service,
            enrollment_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn students(&self) -> Arc<dyn StudentService> {
        self.student_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentService> {
        self.enrollment_service.clone()
    }
}
