//! Student domain entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::StudentIdentifier;

/// Student domain entity.
///
/// `identifier` is the human-readable business key (`CS2024001`);
/// `id` is the surrogate key other records reference.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub identifier: StudentIdentifier,
    pub name: String,
    pub age: i32,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    /// Sequence component of the identifier, persisted for max-sequence
    /// queries within the (major, year) scope
    pub sequence_number: i32,
    pub major_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Enrollment year the identifier sequence is scoped by
    pub fn enrollment_year(&self) -> i32 {
        use chrono::Datelike;
        self.enrollment_date.year()
    }
}

/// Data required to persist a freshly registered student
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub identifier: StudentIdentifier,
    pub name: String,
    pub age: i32,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    pub sequence_number: i32,
    pub major_id: Uuid,
}

/// Student summary returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentResponse {
    pub id: Uuid,
    #[schema(example = "CS2024001")]
    pub student_id: String,
    pub name: String,
    pub age: i32,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    pub major_id: Uuid,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            student_id: student.identifier.into_string(),
            name: student.name,
            age: student.age,
            phone: student.phone,
            enrollment_date: student.enrollment_date,
            major_id: student.major_id,
        }
    }
}
