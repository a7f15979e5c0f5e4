//! Enrollment domain entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A (student, course) association representing an active selection.
///
/// The pair is unique: a student never holds two simultaneous enrollments
/// in the same course. Created by select, destroyed by drop, never updated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub selected_at: DateTime<Utc>,
}

/// An enrollment joined with its course, for per-student listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCourse {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    #[schema(example = "CS101")]
    pub course_code: String,
    pub course_name: String,
    #[schema(value_type = f64, example = 3.5)]
    pub credits: Decimal,
    pub selected_at: DateTime<Utc>,
}

/// Per-course enrollment count, for the statistics endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseStatistics {
    pub course_id: Uuid,
    #[schema(example = "CS101")]
    pub course_code: String,
    pub course_name: String,
    pub enrolled: u64,
}
