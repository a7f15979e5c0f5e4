//! Account repository implementation.

use async_trait::async_trait;
use std::sync::Arc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use super::map_unique_violation;
use crate::domain::Account;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by login name
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Create a new account
    async fn create(
        &self,
        username: String,
        password_digest: String,
        role: String,
        student_id: Option<Uuid>,
    ) -> AppResult<Account>;

    /// Replace the stored digest and clear the first-login flag
    async fn update_password(&self, username: &str, password_digest: String) -> AppResult<Account>;

    /// List all accounts
    async fn list(&self) -> AppResult<Vec<Account>>;

    /// Delete account by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of AccountRepository
pub struct AccountStore {
    db: Arc<DatabaseConnection>,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn create(
        &self,
        username: String,
        password_digest: String,
        role: String,
        student_id: Option<Uuid>,
    ) -> AppResult<Account> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_digest: Set(password_digest),
            role: Set(role),
            first_login: Set(true),
            student_id: Set(student_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, AppError::conflict("Account")))?;

        Ok(Account::from(model))
    }

    async fn update_password(&self, username: &str, password_digest: String) -> AppResult<Account> {
        let account = AccountEntity::find()
            .filter(account::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound("Account"))?;

        let mut active: ActiveModel = account.into();
        active.password_digest = Set(password_digest);
        active.first_login = Set(false);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(Account::from(model))
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = AccountEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Account"));
        }

        Ok(())
    }
}
