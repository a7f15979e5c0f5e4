//! Major repository implementation.

use async_trait::async_trait;
use std::sync::Arc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::entities::major::{ActiveModel, Entity as MajorEntity};
use super::map_unique_violation;
use crate::domain::Major;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Major repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MajorRepository: Send + Sync {
    /// Find major by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Major>>;

    /// List all majors
    async fn list(&self) -> AppResult<Vec<Major>>;

    /// Create a new major
    async fn create(
        &self,
        code: String,
        name: String,
        description: Option<String>,
    ) -> AppResult<Major>;

    /// Update name/description of an existing major
    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Major>;

    /// Delete major by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of MajorRepository
pub struct MajorStore {
    db: Arc<DatabaseConnection>,
}

impl MajorStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MajorRepository for MajorStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Major>> {
        let result = MajorEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Major::from))
    }

    async fn list(&self) -> AppResult<Vec<Major>> {
        let models = MajorEntity::find()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Major::from).collect())
    }

    async fn create(
        &self,
        code: String,
        name: String,
        description: Option<String>,
    ) -> AppResult<Major> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            major_code: Set(code),
            major_name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, AppError::conflict("Major code")))?;

        Ok(Major::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Major> {
        let major = MajorEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound("Major"))?;

        let mut active: ActiveModel = major.into();
        if let Some(name) = name {
            active.major_name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(Major::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = MajorEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Major"));
        }

        Ok(())
    }
}
