//! Enrollment repository implementation.
//!
//! Aggregate queries (credit sums, per-course counts) run in the
//! database rather than in process so they stay consistent with the
//! rows a concurrent writer may be touching.

use async_trait::async_trait;
use std::sync::Arc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::JoinType, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::enrollment::{self, ActiveModel, Entity as EnrollmentEntity};
use super::entities::{course, student};
use super::map_unique_violation;
use crate::domain::{Course, Enrollment, Student};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Enrollment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Find the enrollment for a (student, course) pair
    async fn find_pair(&self, student_id: Uuid, course_id: Uuid)
        -> AppResult<Option<Enrollment>>;

    /// Create an enrollment; a duplicate pair is `AlreadyEnrolled`
    async fn create(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    /// Delete the enrollment for a pair, returning rows removed
    async fn delete_pair(&self, student_id: Uuid, course_id: Uuid) -> AppResult<u64>;

    /// All enrollments (admin overview)
    async fn list_all(&self) -> AppResult<Vec<Enrollment>>;

    /// Enrollments of one student joined with their courses
    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<(Enrollment, Course)>>;

    /// Enrollments in one course joined with their students
    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<(Enrollment, Student)>>;

    /// Sum of credits over a student's current enrollments (0 when none)
    async fn sum_credits(&self, student_id: Uuid) -> AppResult<Decimal>;

    /// Whether any enrollment references the course (deletion guard)
    async fn exists_by_course(&self, course_id: Uuid) -> AppResult<bool>;

    /// Number of enrollments referencing the course
    async fn count_by_course(&self, course_id: Uuid) -> AppResult<u64>;

    /// Whether any enrollment references the student (deletion guard)
    async fn exists_by_student(&self, student_id: Uuid) -> AppResult<bool>;
}

/// Concrete implementation of EnrollmentRepository
pub struct EnrollmentStore {
    db: Arc<DatabaseConnection>,
}

impl EnrollmentStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentStore {
    async fn find_pair(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let result = EnrollmentEntity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Enrollment::from))
    }

    async fn create(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            selected_at: Set(chrono::Utc::now()),
        };

        // The composite unique index is the real duplicate protection;
        // losing the race surfaces as AlreadyEnrolled, never a silent dup.
        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, AppError::AlreadyEnrolled))?;

        Ok(Enrollment::from(model))
    }

    async fn delete_pair(&self, student_id: Uuid, course_id: Uuid) -> AppResult<u64> {
        let result = EnrollmentEntity::delete_many()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn list_all(&self) -> AppResult<Vec<Enrollment>> {
        let models = EnrollmentEntity::find()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Enrollment::from).collect())
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<(Enrollment, Course)>> {
        let rows = EnrollmentEntity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .find_also_related(course::Entity)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(e, c)| c.map(|c| (Enrollment::from(e), Course::from(c))))
            .collect())
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<(Enrollment, Student)>> {
        let rows = EnrollmentEntity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .find_also_related(student::Entity)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(e, s)| s.map(|s| (Enrollment::from(e), Student::from(s))))
            .collect())
    }

    async fn sum_credits(&self, student_id: Uuid) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = EnrollmentEntity::find()
            .select_only()
            .column_as(course::Column::Credits.sum(), "total")
            .join(JoinType::InnerJoin, enrollment::Relation::Course.def())
            .filter(enrollment::Column::StudentId.eq(student_id))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        // SUM over zero rows is NULL; the contract is an exact zero
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn exists_by_course(&self, course_id: Uuid) -> AppResult<bool> {
        Ok(self.count_by_course(course_id).await? > 0)
    }

    async fn count_by_course(&self, course_id: Uuid) -> AppResult<u64> {
        EnrollmentEntity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    async fn exists_by_student(&self, student_id: Uuid) -> AppResult<bool> {
        let count = EnrollmentEntity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}
