//! Catalog service - major and course administration.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Course, Major};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Input for creating or updating a major
#[derive(Debug, Clone)]
pub struct MajorInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a course
#[derive(Debug, Clone)]
pub struct CourseInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: Decimal,
}

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_majors(&self) -> AppResult<Vec<Major>>;
    async fn get_major(&self, id: Uuid) -> AppResult<Major>;
    async fn create_major(&self, input: MajorInput) -> AppResult<Major>;
    async fn update_major(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Major>;

    /// Delete a major unless students are still attached to it
    async fn delete_major(&self, id: Uuid) -> AppResult<()>;

    async fn list_courses(&self) -> AppResult<Vec<Course>>;
    async fn get_course(&self, id: Uuid) -> AppResult<Course>;
    async fn create_course(&self, input: CourseInput) -> AppResult<Course>;
    async fn update_course(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        credits: Option<Decimal>,
    ) -> AppResult<Course>;

    /// Delete a course unless enrollments still reference it
    async fn delete_course(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Catalog<U> {
    /// Create new catalog service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for Catalog<U> {
    async fn list_majors(&self) -> AppResult<Vec<Major>> {
        self.uow.majors().list().await
    }

    async fn get_major(&self, id: Uuid) -> AppResult<Major> {
        self.uow
            .majors()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Major"))
    }

    async fn create_major(&self, input: MajorInput) -> AppResult<Major> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::validation("Major code and name must not be empty"));
        }

        self.uow
            .majors()
            .create(input.code.to_uppercase(), input.name, input.description)
            .await
    }

    async fn update_major(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Major> {
        self.get_major(id).await?;
        self.uow.majors().update(id, name, description).await
    }

    async fn delete_major(&self, id: Uuid) -> AppResult<()> {
        self.get_major(id).await?;

        if self.uow.students().count_by_major(id).await? > 0 {
            return Err(AppError::InUse("Major"));
        }

        self.uow.majors().delete(id).await
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.uow.courses().list().await
    }

    async fn get_course(&self, id: Uuid) -> AppResult<Course> {
        self.uow
            .courses()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Course"))
    }

    async fn create_course(&self, input: CourseInput) -> AppResult<Course> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::validation(
                "Course code and name must not be empty",
            ));
        }
        if input.credits < Decimal::ZERO {
            return Err(AppError::validation("Credits must not be negative"));
        }

        self.uow
            .courses()
            .create(input.code, input.name, input.description, input.credits)
            .await
    }

    async fn update_course(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        credits: Option<Decimal>,
    ) -> AppResult<Course> {
        self.get_course(id).await?;

        if let Some(credits) = credits {
            if credits < Decimal::ZERO {
                return Err(AppError::validation("Credits must not be negative"));
            }
        }

        self.uow.courses().update(id, name, description, credits).await
    }

    async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        self.get_course(id).await?;

        if self.uow.enrollments().exists_by_course(id).await? {
            return Err(AppError::InUse("Course"));
        }

        self.uow.courses().delete(id).await
    }
}
