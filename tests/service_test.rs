//! Service unit tests over mocked repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;
use rust_decimal::Decimal;
use uuid::Uuid;

use student_registry::config::Config;
use student_registry::domain::{
    Account, Course, Enrollment, Major, Password, Role, Student, StudentIdentifier,
};
use student_registry::errors::{AppError, AppResult, AuthFailure};
use student_registry::infra::repositories::{
    MockAccountRepository, MockCourseRepository, MockEnrollmentRepository, MockMajorRepository,
    MockStudentRepository,
};
use student_registry::infra::{
    AccountRepository, CourseRepository, EnrollmentRepository, MajorRepository, StudentRepository,
    TransactionContext, UnitOfWork,
};
use student_registry::services::{
    Authenticator, AuthService, Catalog, CatalogService, EnrollmentEngine, EnrollmentService,
    MajorInput, Registrar, StudentRegistration, StudentService,
};

/// Repository mocks assembled into a UnitOfWork for service tests.
///
/// The generic transaction methods cannot be mocked; flows that begin a
/// transaction are covered in the service unit tests with a scripted
/// database backend.
#[derive(Default)]
struct Mocks {
    accounts: MockAccountRepository,
    students: MockStudentRepository,
    majors: MockMajorRepository,
    courses: MockCourseRepository,
    enrollments: MockEnrollmentRepository,
}

struct TestUnitOfWork {
    accounts: Arc<MockAccountRepository>,
    students: Arc<MockStudentRepository>,
    majors: Arc<MockMajorRepository>,
    courses: Arc<MockCourseRepository>,
    enrollments: Arc<MockEnrollmentRepository>,
}

impl Mocks {
    fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            accounts: Arc::new(self.accounts),
            students: Arc::new(self.students),
            majors: Arc::new(self.majors),
            courses: Arc::new(self.courses),
            enrollments: Arc::new(self.enrollments),
        })
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
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

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn test_config() -> Config {
    Config::with_secret("integration-test-secret-key-32-chars!")
}

fn test_account(username: &str, password: &str) -> Account {
    Account {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_digest: Password::new(password).unwrap().into_string(),
        role: Role::Student,
        first_login: true,
        student_id: Some(Uuid::new_v4()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_student(id: Uuid) -> Student {
    Student {
        id,
        identifier: StudentIdentifier::from_string("CS2024001".to_string()),
        name: "Alice Zhang".to_string(),
        age: 20,
        phone: "13800001111".to_string(),
        enrollment_date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        sequence_number: 1,
        major_id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_major(id: Uuid) -> Major {
    Major {
        id,
        code: "CS".to_string(),
        name: "Computer Science".to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_course(id: Uuid, credits: Decimal) -> Course {
    Course {
        id,
        code: "CS101".to_string(),
        name: "Introduction to Programming".to_string(),
        description: None,
        credits,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_succeeds_and_token_carries_the_username() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .with(eq("CS2024001"))
        .returning(move |_| Ok(Some(account.clone())));

    let service = Authenticator::new(mocks.into_uow(), test_config());
    let login = service
        .login("CS2024001".to_string(), "Correct1!".to_string())
        .await
        .unwrap();

    assert_eq!(login.token.token_type, "Bearer");
    let claims = service.verify_token(&login.token.access_token).unwrap();
    assert_eq!(claims.sub, "CS2024001");
    assert_eq!(claims.role, "STUDENT");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));

    let service = Authenticator::new(mocks.into_uow(), test_config());
    let err = service
        .login("CS2024001".to_string(), "wrong".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_with_unknown_username_is_rejected_identically() {
    let mut mocks = Mocks::default();
    mocks
        .accounts
        .expect_find_by_username()
        .returning(|_| Ok(None));

    let service = Authenticator::new(mocks.into_uow(), test_config());
    let err = service
        .login("nobody".to_string(), "whatever".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn change_password_requires_the_current_password() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));

    let service = Authenticator::new(mocks.into_uow(), test_config());
    let err = service
        .change_password("CS2024001", "wrong".to_string(), "NewPass1!".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn change_password_rejects_weak_replacements() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));

    let service = Authenticator::new(mocks.into_uow(), test_config());

    // The seeded default itself fails the policy: too short, no letters
    let err = service
        .change_password("CS2024001", "Correct1!".to_string(), "123456".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::WeakPassword));
}

#[tokio::test]
async fn change_password_stores_a_new_digest() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));
    mocks
        .accounts
        .expect_update_password()
        .withf(|username, digest| username == "CS2024001" && digest.starts_with("$argon2"))
        .returning(|username, _| {
            let mut updated = test_account(username, "NewPass1!");
            updated.first_login = false;
            Ok(updated)
        });

    let service = Authenticator::new(mocks.into_uow(), test_config());
    service
        .change_password("CS2024001", "Correct1!".to_string(), "NewPass1!".to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn subject_of_returns_the_verified_token_subject() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));

    let service = Authenticator::new(mocks.into_uow(), test_config());
    let login = service
        .login("CS2024001".to_string(), "Correct1!".to_string())
        .await
        .unwrap();

    let subject = service.subject_of(&login.token.access_token).unwrap();
    assert_eq!(subject, "CS2024001");
}

#[tokio::test]
async fn subject_of_rejects_tokens_signed_with_another_key() {
    let mut mocks = Mocks::default();
    let account = test_account("CS2024001", "Correct1!");
    mocks
        .accounts
        .expect_find_by_username()
        .returning(move |_| Ok(Some(account.clone())));

    let issuer = Authenticator::new(mocks.into_uow(), test_config());
    let login = issuer
        .login("CS2024001".to_string(), "Correct1!".to_string())
        .await
        .unwrap();

    let verifier = Authenticator::new(
        Mocks::default().into_uow(),
        Config::with_secret("another-signing-secret-of-32-chars!"),
    );
    let err = verifier
        .subject_of(&login.token.access_token)
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthFailure::BadSignature)));
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registration_rejects_blank_names_before_touching_the_database() {
    let mocks = Mocks::default();
    let service = Registrar::new(mocks.into_uow());

    let err = service
        .register(StudentRegistration {
            name: "  ".to_string(),
            age: 20,
            phone: "13800001111".to_string(),
            enrollment_date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            major_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn get_student_maps_missing_rows_to_not_found() {
    let mut mocks = Mocks::default();
    mocks.students.expect_find_by_id().returning(|_| Ok(None));

    let service = Registrar::new(mocks.into_uow());
    let err = service.get_student(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound("Student")));
}

#[tokio::test]
async fn students_with_enrollments_cannot_be_deleted() {
    let student_id = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks
        .students
        .expect_find_by_id()
        .with(eq(student_id))
        .returning(|id| Ok(Some(test_student(id))));
    mocks
        .enrollments
        .expect_exists_by_student()
        .with(eq(student_id))
        .returning(|_| Ok(true));

    let service = Registrar::new(mocks.into_uow());
    let err = service.delete_student(student_id).await.unwrap_err();

    assert!(matches!(err, AppError::InUse("Student")));
}

#[tokio::test]
async fn students_without_enrollments_are_deleted() {
    let student_id = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks
        .students
        .expect_find_by_id()
        .returning(|id| Ok(Some(test_student(id))));
    mocks
        .enrollments
        .expect_exists_by_student()
        .returning(|_| Ok(false));
    mocks
        .students
        .expect_delete()
        .with(eq(student_id))
        .returning(|_| Ok(()));

    let service = Registrar::new(mocks.into_uow());
    service.delete_student(student_id).await.unwrap();
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropping_a_course_never_selected_is_rejected() {
    let mut mocks = Mocks::default();
    mocks
        .enrollments
        .expect_delete_pair()
        .returning(|_, _| Ok(0));

    let service = EnrollmentEngine::new(mocks.into_uow());
    let err = service
        .drop_course(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotEnrolled));
}

#[tokio::test]
async fn dropping_an_existing_enrollment_succeeds() {
    let mut mocks = Mocks::default();
    mocks
        .enrollments
        .expect_delete_pair()
        .returning(|_, _| Ok(1));

    let service = EnrollmentEngine::new(mocks.into_uow());
    service
        .drop_course(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
}

#[tokio::test]
async fn credit_total_is_zero_without_enrollments() {
    let mut mocks = Mocks::default();
    mocks
        .enrollments
        .expect_sum_credits()
        .returning(|_| Ok(Decimal::ZERO));

    let service = EnrollmentEngine::new(mocks.into_uow());
    let total = service.total_credits(Uuid::new_v4()).await.unwrap();

    assert_eq!(total, Decimal::ZERO);
}

#[tokio::test]
async fn enrolled_courses_carry_course_details() {
    let student_id = Uuid::new_v4();
    let course_id = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks
        .enrollments
        .expect_list_by_student()
        .with(eq(student_id))
        .returning(move |sid| {
            let enrollment = Enrollment {
                id: Uuid::new_v4(),
                student_id: sid,
                course_id,
                selected_at: Utc::now(),
            };
            Ok(vec![(enrollment, test_course(course_id, Decimal::new(35, 1)))])
        });

    let service = EnrollmentEngine::new(mocks.into_uow());
    let courses = service.courses_of(student_id).await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].course_code, "CS101");
    assert_eq!(courses[0].credits, Decimal::new(35, 1));
}

#[tokio::test]
async fn statistics_count_every_course_even_empty_ones() {
    let popular = Uuid::new_v4();
    let empty = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks.courses.expect_list().returning(move || {
        Ok(vec![
            test_course(popular, Decimal::new(30, 1)),
            test_course(empty, Decimal::new(20, 1)),
        ])
    });
    mocks
        .enrollments
        .expect_count_by_course()
        .returning(move |id| Ok(if id == popular { 3 } else { 0 }));

    let service = EnrollmentEngine::new(mocks.into_uow());
    let stats = service.statistics().await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats.iter().find(|s| s.course_id == popular).unwrap().enrolled, 3);
    assert_eq!(stats.iter().find(|s| s.course_id == empty).unwrap().enrolled, 0);
}

#[tokio::test]
async fn courses_without_enrollments_are_deletable() {
    let mut mocks = Mocks::default();
    mocks
        .enrollments
        .expect_exists_by_course()
        .returning(|_| Ok(false));

    let service = EnrollmentEngine::new(mocks.into_uow());
    assert!(service.can_delete_course(Uuid::new_v4()).await.unwrap());
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn major_codes_are_stored_uppercase() {
    let mut mocks = Mocks::default();
    mocks
        .majors
        .expect_create()
        .withf(|code, name, _| code == "CS" && name == "Computer Science")
        .returning(|code, name, description| {
            Ok(Major {
                id: Uuid::new_v4(),
                code,
                name,
                description,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

    let service = Catalog::new(mocks.into_uow());
    let major = service
        .create_major(MajorInput {
            code: "cs".to_string(),
            name: "Computer Science".to_string(),
            description: None,
        })
        .await
        .unwrap();

    assert_eq!(major.code, "CS");
}

#[tokio::test]
async fn majors_with_students_cannot_be_deleted() {
    let major_id = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks
        .majors
        .expect_find_by_id()
        .returning(|id| Ok(Some(test_major(id))));
    mocks
        .students
        .expect_count_by_major()
        .with(eq(major_id))
        .returning(|_| Ok(2));

    let service = Catalog::new(mocks.into_uow());
    let err = service.delete_major(major_id).await.unwrap_err();

    assert!(matches!(err, AppError::InUse("Major")));
}

#[tokio::test]
async fn courses_with_enrollments_cannot_be_deleted() {
    let course_id = Uuid::new_v4();

    let mut mocks = Mocks::default();
    mocks
        .courses
        .expect_find_by_id()
        .returning(move |id| Ok(Some(test_course(id, Decimal::new(30, 1)))));
    mocks
        .enrollments
        .expect_exists_by_course()
        .returning(|_| Ok(true));

    let service = Catalog::new(mocks.into_uow());
    let err = service.delete_course(course_id).await.unwrap_err();

    assert!(matches!(err, AppError::InUse("Course")));
}

#[tokio::test]
async fn missing_courses_surface_as_not_found() {
    let mut mocks = Mocks::default();
    mocks.courses.expect_find_by_id().returning(|_| Ok(None));

    let service = Catalog::new(mocks.into_uow());
    let err = service.get_course(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound("Course")));
}
