//! Student service - registration and student administration.
//!
//! Registration is the one flow that allocates a student identifier.
//! The whole sequence (phone uniqueness check, major lookup, sequence
//! query, student insert, account insert) runs in a single serializable
//! transaction so two concurrent registrations in the same (major, year)
//! scope cannot both observe the same maximum sequence.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DEFAULT_STUDENT_PASSWORD, ROLE_STUDENT};
use crate::domain::{NewStudent, Password, StudentIdentifier, StudentResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Input for registering a new student
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub name: String,
    pub age: i32,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    pub major_id: Uuid,
}

/// Student service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentService: Send + Sync {
    /// Register a student: allocate an identifier scoped by (major, year),
    /// persist the student, and seed an account under the default password.
    async fn register(&self, registration: StudentRegistration) -> AppResult<StudentResponse>;

    /// List all students
    async fn list_students(&self) -> AppResult<Vec<StudentResponse>>;

    /// Get one student by surrogate ID
    async fn get_student(&self, id: Uuid) -> AppResult<StudentResponse>;

    /// Look a student up by their business identifier (`CS2024001`)
    async fn get_by_identifier(&self, identifier: &str) -> AppResult<StudentResponse>;

    /// Delete a student unless they still hold enrollments
    async fn delete_student(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of StudentService using Unit of Work.
pub struct Registrar<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Registrar<U> {
    /// Create new student service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> StudentService for Registrar<U> {
    async fn register(&self, registration: StudentRegistration) -> AppResult<StudentResponse> {
        if registration.name.trim().is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }
        if registration.age <= 0 {
            return Err(AppError::validation("Age must be positive"));
        }

        let student = self
            .uow
            .transaction_serializable(|ctx| {
                Box::pin(async move {
                    let students = ctx.students();

                    if students.exists_by_phone(&registration.phone).await? {
                        return Err(AppError::DuplicatePhone);
                    }

                    let major = ctx
                        .majors()
                        .find_by_id(registration.major_id)
                        .await?
                        .ok_or(AppError::NotFound("Major"))?;

                    let year = registration.enrollment_date.year();
                    let next = students.max_sequence(major.id, year).await?.unwrap_or(0) + 1;
                    let identifier = StudentIdentifier::compose(&major.code, year, next as u32)?;

                    // The unique column is the real guard; this read turns a
                    // stale sequence into a clean error before the insert.
                    if students
                        .find_by_identifier(identifier.as_str())
                        .await?
                        .is_some()
                    {
                        return Err(AppError::AllocationConflict);
                    }

                    let student = students
                        .create(NewStudent {
                            identifier: identifier.clone(),
                            name: registration.name,
                            age: registration.age,
                            phone: registration.phone,
                            enrollment_date: registration.enrollment_date,
                            sequence_number: next,
                            major_id: major.id,
                        })
                        .await?;

                    let digest = Password::new(DEFAULT_STUDENT_PASSWORD)?.into_string();
                    ctx.accounts()
                        .create(
                            identifier.into_string(),
                            digest,
                            ROLE_STUDENT.to_string(),
                            Some(student.id),
                        )
                        .await?;

                    Ok(student)
                })
            })
            .await?;

        tracing::info!(
            student_id = %student.identifier,
            "student registered with seeded account"
        );

        Ok(StudentResponse::from(student))
    }

    async fn list_students(&self) -> AppResult<Vec<StudentResponse>> {
        let students = self.uow.students().list().await?;
        Ok(students.into_iter().map(StudentResponse::from).collect())
    }

    async fn get_student(&self, id: Uuid) -> AppResult<StudentResponse> {
        let student = self
            .uow
            .students()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Student"))?;

        Ok(StudentResponse::from(student))
    }

    async fn get_by_identifier(&self, identifier: &str) -> AppResult<StudentResponse> {
        let student = self
            .uow
            .students()
            .find_by_identifier(identifier)
            .await?
            .ok_or(AppError::NotFound("Student"))?;

        Ok(StudentResponse::from(student))
    }

    async fn delete_student(&self, id: Uuid) -> AppResult<()> {
        let student = self
            .uow
            .students()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Student"))?;

        if self.uow.enrollments().exists_by_student(student.id).await? {
            return Err(AppError::InUse("Student"));
        }

        self.uow.students().delete(student.id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use super::*;
    use crate::infra::repositories::entities::{account, major, student};
    use crate::infra::Persistence;

    fn phone_count_row(count: i64) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("num_items", Value::BigInt(Some(count)));
        row
    }

    fn max_sequence_row(max: Option<i32>) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("max_sequence", Value::Int(max));
        row
    }

    fn major_row(id: Uuid) -> major::Model {
        major::Model {
            id,
            major_code: "CS".to_string(),
            major_name: "Computer Science".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn student_row(identifier: &str, sequence: i32, major_id: Uuid) -> student::Model {
        student::Model {
            id: Uuid::new_v4(),
            student_id: identifier.to_string(),
            name: "Alice Zhang".to_string(),
            age: 20,
            phone: "13800001111".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            sequence_number: sequence,
            major_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn account_row(username: &str, student_id: Uuid) -> account::Model {
        account::Model {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_digest: "$argon2id$v=19$stub".to_string(),
            role: ROLE_STUDENT.to_string(),
            first_login: true,
            student_id: Some(student_id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration(major_id: Uuid) -> StudentRegistration {
        StudentRegistration {
            name: "Alice Zhang".to_string(),
            age: 20,
            phone: "13800001111".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            major_id,
        }
    }

    // Result sets are consumed in statement order: phone count, major
    // lookup, max sequence, identifier re-read, student insert, account
    // insert.
    #[tokio::test]
    async fn registration_advances_the_sequence_within_its_scope() {
        let major_id = Uuid::new_v4();
        let created = student_row("CS2024002", 2, major_id);
        let seeded = account_row("CS2024002", created.id);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![phone_count_row(0)]])
                .append_query_results([vec![major_row(major_id)]])
                .append_query_results([vec![max_sequence_row(Some(1))]])
                .append_query_results([Vec::<student::Model>::new()])
                .append_query_results([vec![created]])
                .append_query_results([vec![seeded]])
                .into_connection(),
        );

        let service = Registrar::new(Arc::new(Persistence::new(db.clone())));
        let response = service.register(registration(major_id)).await.unwrap();

        assert_eq!(response.student_id, "CS2024002");

        // The composed identifier must appear in the student insert.
        drop(service);
        let db = Arc::into_inner(db).expect("all connection handles released");
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("CS2024002"));
    }

    #[tokio::test]
    async fn first_registration_in_a_scope_gets_sequence_one() {
        let major_id = Uuid::new_v4();
        let created = student_row("CS2024001", 1, major_id);
        let seeded = account_row("CS2024001", created.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![phone_count_row(0)]])
            .append_query_results([vec![major_row(major_id)]])
            .append_query_results([vec![max_sequence_row(None)]])
            .append_query_results([Vec::<student::Model>::new()])
            .append_query_results([vec![created]])
            .append_query_results([vec![seeded]])
            .into_connection();

        let service = Registrar::new(Arc::new(Persistence::new(db)));
        let response = service.register(registration(major_id)).await.unwrap();

        assert_eq!(response.student_id, "CS2024001");
    }

    #[tokio::test]
    async fn stale_sequence_reads_surface_as_allocation_conflicts() {
        let major_id = Uuid::new_v4();
        let holder = student_row("CS2024001", 1, major_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![phone_count_row(0)]])
            .append_query_results([vec![major_row(major_id)]])
            .append_query_results([vec![max_sequence_row(None)]])
            .append_query_results([vec![holder]])
            .into_connection();

        let service = Registrar::new(Arc::new(Persistence::new(db)));
        let err = service.register(registration(major_id)).await.unwrap_err();

        assert!(matches!(err, AppError::AllocationConflict));
    }

    #[tokio::test]
    async fn duplicate_phones_abort_before_any_allocation() {
        let major_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![phone_count_row(1)]])
            .into_connection();

        let service = Registrar::new(Arc::new(Persistence::new(db)));
        let err = service.register(registration(major_id)).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicatePhone));
    }
}
