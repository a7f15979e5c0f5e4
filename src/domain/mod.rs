//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod account;
pub mod course;
pub mod enrollment;
pub mod major;
pub mod password;
pub mod student;
pub mod student_id;

pub use account::{Account, AccountResponse, Role};
pub use course::Course;
pub use enrollment::{CourseStatistics, EnrolledCourse, Enrollment};
pub use major::Major;
pub use password::Password;
pub use student::{NewStudent, Student, StudentResponse};
pub use student_id::StudentIdentifier;
