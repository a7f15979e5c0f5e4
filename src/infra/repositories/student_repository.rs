//! Student repository implementation.
//!
//! The max-sequence query scopes by (major, enrollment year) and is
//! advisory only; the unique index on `student_id` is what actually
//! prevents duplicate identifiers under concurrent registration.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::student::{self, ActiveModel, Entity as StudentEntity};
use super::map_unique_violation;
use crate::domain::{NewStudent, Student};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Student repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find student by surrogate ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>>;

    /// Find student by business identifier (e.g. `CS2024001`)
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Student>>;

    /// Whether a student with this phone number already exists
    async fn exists_by_phone(&self, phone: &str) -> AppResult<bool>;

    /// Highest identifier sequence allocated within (major, enrollment year)
    async fn max_sequence(&self, major_id: Uuid, year: i32) -> AppResult<Option<i32>>;

    /// Persist a freshly registered student
    async fn create(&self, new: NewStudent) -> AppResult<Student>;

    /// List all students
    async fn list(&self) -> AppResult<Vec<Student>>;

    /// Number of students belonging to a major (deletion guard input)
    async fn count_by_major(&self, major_id: Uuid) -> AppResult<u64>;

    /// Delete student by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of StudentRepository
pub struct StudentStore {
    db: Arc<DatabaseConnection>,
}

impl StudentStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// First and last day of a calendar year, for scoping the sequence query
pub(crate) fn year_bounds(year: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::validation("Invalid enrollment year"))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| AppError::validation("Invalid enrollment year"))?;
    Ok((start, end))
}

#[async_trait]
impl StudentRepository for StudentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        let result = StudentEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Student::from))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Student>> {
        let result = StudentEntity::find()
            .filter(student::Column::StudentId.eq(identifier))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Student::from))
    }

    async fn exists_by_phone(&self, phone: &str) -> AppResult<bool> {
        let count = StudentEntity::find()
            .filter(student::Column::Phone.eq(phone))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn max_sequence(&self, major_id: Uuid, year: i32) -> AppResult<Option<i32>> {
        let (start, end) = year_bounds(year)?;

        let max: Option<Option<i32>> = StudentEntity::find()
            .select_only()
            .column_as(student::Column::SequenceNumber.max(), "max_sequence")
            .filter(student::Column::MajorId.eq(major_id))
            .filter(student::Column::EnrollmentDate.between(start, end))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(max.flatten())
    }

    async fn create(&self, new: NewStudent) -> AppResult<Student> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(new.identifier.into_string()),
            name: Set(new.name),
            age: Set(new.age),
            phone: Set(new.phone),
            enrollment_date: Set(new.enrollment_date),
            sequence_number: Set(new.sequence_number),
            major_id: Set(new.major_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // A violated identifier or phone index means we lost a race with a
        // concurrent registration; the caller retries the whole transaction.
        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, AppError::AllocationConflict))?;

        Ok(Student::from(model))
    }

    async fn list(&self) -> AppResult<Vec<Student>> {
        let models = StudentEntity::find()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Student::from).collect())
    }

    async fn count_by_major(&self, major_id: Uuid) -> AppResult<u64> {
        StudentEntity::find()
            .filter(student::Column::MajorId.eq(major_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = StudentEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Student"));
        }

        Ok(())
    }
}
