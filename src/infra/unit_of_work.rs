//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and manages database transactions.
//! Registration (phone check, sequence query, student + account insert)
//! and course selection (existence checks, duplicate check, insert) are
//! the two read-check-write sequences that must commit as one unit.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{account, course, enrollment, major, student};
use super::repositories::{
    AccountRepository, AccountStore, CourseRepository, CourseStore, EnrollmentRepository,
    EnrollmentStore, MajorRepository, MajorStore, StudentRepository, StudentStore,
};
use crate::domain::{Account, Course, Enrollment, Major, NewStudent, Student};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction
/// management. The generic transaction methods cannot be mocked with
/// mockall; tests either mock the repositories or the services.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn accounts(&self) -> Arc<dyn AccountRepository>;
    fn students(&self) -> Arc<dyn StudentRepository>;
    fn majors(&self) -> Arc<dyn MajorRepository>;
    fn courses(&self) -> Arc<dyn CourseRepository>;
    fn enrollments(&self) -> Arc<dyn EnrollmentRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a Serializable transaction.
    ///
    /// Used where the read-check-write window must not interleave.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access scoped to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn accounts(&self) -> TxAccountRepository<'_> {
        TxAccountRepository { txn: self.txn }
    }

    pub fn students(&self) -> TxStudentRepository<'_> {
        TxStudentRepository { txn: self.txn }
    }

    pub fn majors(&self) -> TxMajorRepository<'_> {
        TxMajorRepository { txn: self.txn }
    }

    pub fn courses(&self) -> TxCourseRepository<'_> {
        TxCourseRepository { txn: self.txn }
    }

    pub fn enrollments(&self) -> TxEnrollmentRepository<'_> {
        TxEnrollmentRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    accounts: Arc<AccountStore>,
    students: Arc<StudentStore>,
    majors: Arc<MajorStore>,
    courses: Arc<CourseStore>,
    enrollments: Arc<EnrollmentStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        let db = db.into();
        Self {
            accounts: Arc::new(AccountStore::new(db.clone())),
            students: Arc::new(StudentStore::new(db.clone())),
            majors: Arc::new(MajorStore::new(db.clone())),
            courses: Arc::new(CourseStore::new(db.clone())),
            enrollments: Arc::new(EnrollmentStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    fn students(&self) -> Arc<dyn StudentRepository> {
        self.students.clone()
    }

    fn majors(&self) -> Arc<dyn MajorRepository> {
        self.majors.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.courses.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.enrollments.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}

// Transaction-scoped repositories.
//
// These carry only the operations the transactional use cases need;
// everything else goes through the connection-backed stores.

/// Account operations inside a transaction
pub struct TxAccountRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAccountRepository<'a> {
    pub async fn create(
        &self,
        username: String,
        password_digest: String,
        role: String,
        student_id: Option<Uuid>,
    ) -> AppResult<Account> {
        let now = chrono::Utc::now();
        let active_model = account::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_digest: Set(password_digest),
            role: Set(role),
            first_login: Set(true),
            student_id: Set(student_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.map_err(|e| {
            super::repositories::map_unique_violation(e, AppError::conflict("Account"))
        })?;

        Ok(Account::from(model))
    }
}

/// Student operations inside a transaction
pub struct TxStudentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxStudentRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        let result = student::Entity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Student::from))
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Student>> {
        let result = student::Entity::find()
            .filter(student::Column::StudentId.eq(identifier))
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Student::from))
    }

    pub async fn exists_by_phone(&self, phone: &str) -> AppResult<bool> {
        let count = student::Entity::find()
            .filter(student::Column::Phone.eq(phone))
            .count(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    pub async fn max_sequence(&self, major_id: Uuid, year: i32) -> AppResult<Option<i32>> {
        let (start, end) = super::repositories::year_bounds(year)?;

        let max: Option<Option<i32>> = student::Entity::find()
            .select_only()
            .column_as(student::Column::SequenceNumber.max(), "max_sequence")
            .filter(student::Column::MajorId.eq(major_id))
            .filter(student::Column::EnrollmentDate.between(start, end))
            .into_tuple()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(max.flatten())
    }

    pub async fn create(&self, new: NewStudent) -> AppResult<Student> {
        let now = chrono::Utc::now();
        let active_model = student::ActiveModel {
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

        let model = active_model.insert(self.txn).await.map_err(|e| {
            super::repositories::map_unique_violation(e, AppError::AllocationConflict)
        })?;

        Ok(Student::from(model))
    }
}

/// Major lookups inside a transaction
pub struct TxMajorRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxMajorRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Major>> {
        let result = major::Entity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Major::from))
    }
}

/// Course lookups inside a transaction
pub struct TxCourseRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCourseRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = course::Entity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Course::from))
    }
}

/// Enrollment operations inside a transaction
pub struct TxEnrollmentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEnrollmentRepository<'a> {
    pub async fn find_pair(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let result = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Enrollment::from))
    }

    pub async fn create(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let active_model = enrollment::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            selected_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.txn).await.map_err(|e| {
            super::repositories::map_unique_violation(e, AppError::AlreadyEnrolled)
        })?;

        Ok(Enrollment::from(model))
    }
}
