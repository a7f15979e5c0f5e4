//! Course repository implementation.

use async_trait::async_trait;
use std::sync::Arc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::entities::course::{ActiveModel, Entity as CourseEntity};
use super::map_unique_violation;
use crate::domain::Course;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Course repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Find course by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    /// List all courses
    async fn list(&self) -> AppResult<Vec<Course>>;

    /// Create a new course
    async fn create(
        &self,
        code: String,
        name: String,
        description: Option<String>,
        credits: Decimal,
    ) -> AppResult<Course>;

    /// Update an existing course
    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        credits: Option<Decimal>,
    ) -> AppResult<Course>;

    /// Delete course by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CourseRepository
pub struct CourseStore {
    db: Arc<DatabaseConnection>,
}

impl CourseStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Course::from))
    }

    async fn list(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(
        &self,
        code: String,
        name: String,
        description: Option<String>,
        credits: Decimal,
    ) -> AppResult<Course> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            course_code: Set(code),
            course_name: Set(name),
            description: Set(description),
            credits: Set(credits),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, AppError::conflict("Course code")))?;

        Ok(Course::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
        credits: Option<Decimal>,
    ) -> AppResult<Course> {
        let course = CourseEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound("Course"))?;

        let mut active: ActiveModel = course.into();
        if let Some(name) = name {
            active.course_name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        if let Some(credits) = credits {
            active.credits = Set(credits);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(Course::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CourseEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Course"));
        }

        Ok(())
    }
}
