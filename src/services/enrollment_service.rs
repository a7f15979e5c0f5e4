//! Enrollment service - course selection, withdrawal, and rollups.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CourseStatistics, EnrolledCourse, Enrollment, StudentResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Enrollment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enroll a student in a course; each (student, course) pair at most once
    async fn select_course(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    /// Withdraw a student from a course they are enrolled in
    async fn drop_course(&self, student_id: Uuid, course_id: Uuid) -> AppResult<()>;

    /// Courses a student is currently enrolled in
    async fn courses_of(&self, student_id: Uuid) -> AppResult<Vec<EnrolledCourse>>;

    /// Sum of credits over a student's enrollments; zero when none
    async fn total_credits(&self, student_id: Uuid) -> AppResult<Decimal>;

    /// All enrollment records (admin)
    async fn list_all(&self) -> AppResult<Vec<Enrollment>>;

    /// Students enrolled in a course (admin)
    async fn students_in_course(&self, course_id: Uuid) -> AppResult<Vec<StudentResponse>>;

    /// Per-course enrollment counts (admin)
    async fn statistics(&self) -> AppResult<Vec<CourseStatistics>>;

    /// Whether a course has no enrollments and may be deleted
    async fn can_delete_course(&self, course_id: Uuid) -> AppResult<bool>;
}

/// Concrete implementation of EnrollmentService using Unit of Work.
pub struct EnrollmentEngine<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EnrollmentEngine<U> {
    /// Create new enrollment service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> EnrollmentService for EnrollmentEngine<U> {
    async fn select_course(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let enrollment = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    ctx.students()
                        .find_by_id(student_id)
                        .await?
                        .ok_or(AppError::NotFound("Student"))?;

                    ctx.courses()
                        .find_by_id(course_id)
                        .await?
                        .ok_or(AppError::NotFound("Course"))?;

                    if ctx
                        .enrollments()
                        .find_pair(student_id, course_id)
                        .await?
                        .is_some()
                    {
                        return Err(AppError::AlreadyEnrolled);
                    }

                    // The unique (student, course) index backs this up if a
                    // concurrent selection slips past the read.
                    ctx.enrollments().create(student_id, course_id).await
                })
            })
            .await?;

        tracing::info!(%student_id, %course_id, "course selected");
        Ok(enrollment)
    }

    async fn drop_course(&self, student_id: Uuid, course_id: Uuid) -> AppResult<()> {
        let removed = self
            .uow
            .enrollments()
            .delete_pair(student_id, course_id)
            .await?;

        if removed == 0 {
            return Err(AppError::NotEnrolled);
        }

        tracing::info!(%student_id, %course_id, "course dropped");
        Ok(())
    }

    async fn courses_of(&self, student_id: Uuid) -> AppResult<Vec<EnrolledCourse>> {
        let rows = self.uow.enrollments().list_by_student(student_id).await?;

        Ok(rows
            .into_iter()
            .map(|(enrollment, course)| EnrolledCourse {
                enrollment_id: enrollment.id,
                course_id: course.id,
                course_code: course.code,
                course_name: course.name,
                credits: course.credits,
                selected_at: enrollment.selected_at,
            })
            .collect())
    }

    async fn total_credits(&self, student_id: Uuid) -> AppResult<Decimal> {
        self.uow.enrollments().sum_credits(student_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Enrollment>> {
        self.uow.enrollments().list_all().await
    }

    async fn students_in_course(&self, course_id: Uuid) -> AppResult<Vec<StudentResponse>> {
        self.uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or(AppError::NotFound("Course"))?;

        let rows = self.uow.enrollments().list_by_course(course_id).await?;
        Ok(rows
            .into_iter()
            .map(|(_, student)| StudentResponse::from(student))
            .collect())
    }

    async fn statistics(&self) -> AppResult<Vec<CourseStatistics>> {
        let courses = self.uow.courses().list().await?;
        let enrollments = self.uow.enrollments();

        // Counts are independent per course; fetch them concurrently.
        let counts = futures::future::try_join_all(
            courses
                .iter()
                .map(|course| enrollments.count_by_course(course.id)),
        )
        .await?;

        Ok(courses
            .into_iter()
            .zip(counts)
            .map(|(course, enrolled)| CourseStatistics {
                course_id: course.id,
                course_code: course.code,
                course_name: course.name,
                enrolled,
            })
            .collect())
    }

    async fn can_delete_course(&self, course_id: Uuid) -> AppResult<bool> {
        Ok(!self.uow.enrollments().exists_by_course(course_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::infra::repositories::entities::{course, enrollment, student};
    use crate::infra::Persistence;

    fn student_row(id: Uuid) -> student::Model {
        student::Model {
            id,
            student_id: "CS2024001".to_string(),
            name: "Alice Zhang".to_string(),
            age: 20,
            phone: "13800001111".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            sequence_number: 1,
            major_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn course_row(id: Uuid) -> course::Model {
        course::Model {
            id,
            course_code: "CS101".to_string(),
            course_name: "Introduction to Programming".to_string(),
            description: None,
            credits: Decimal::new(25, 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn enrollment_row(student_id: Uuid, course_id: Uuid) -> enrollment::Model {
        enrollment::Model {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            selected_at: Utc::now(),
        }
    }

    // Result sets are consumed in statement order: student lookup,
    // course lookup, pair read, insert.
    #[tokio::test]
    async fn first_selection_commits_a_new_enrollment() {
        let student_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let created = enrollment_row(student_id, course_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row(student_id)]])
            .append_query_results([vec![course_row(course_id)]])
            .append_query_results([Vec::<enrollment::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let service = EnrollmentEngine::new(Arc::new(Persistence::new(db)));
        let enrollment = service.select_course(student_id, course_id).await.unwrap();

        assert_eq!(enrollment.student_id, student_id);
        assert_eq!(enrollment.course_id, course_id);
    }

    #[tokio::test]
    async fn selecting_the_same_course_twice_is_rejected() {
        let student_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row(student_id)]])
            .append_query_results([vec![course_row(course_id)]])
            .append_query_results([vec![enrollment_row(student_id, course_id)]])
            .into_connection();

        let service = EnrollmentEngine::new(Arc::new(Persistence::new(db)));
        let err = service
            .select_course(student_id, course_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyEnrolled));
    }

    #[tokio::test]
    async fn selecting_an_unknown_course_is_rejected() {
        let student_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student_row(student_id)]])
            .append_query_results([Vec::<course::Model>::new()])
            .into_connection();

        let service = EnrollmentEngine::new(Arc::new(Persistence::new(db)));
        let err = service
            .select_course(student_id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound("Course")));
    }
}
