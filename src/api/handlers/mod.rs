//! HTTP request handlers.

pub mod auth_handler;
pub mod course_handler;
pub mod enrollment_handler;
pub mod major_handler;
pub mod student_handler;

pub use auth_handler::{auth_public_routes, auth_routes};
pub use course_handler::course_routes;
pub use enrollment_handler::enrollment_routes;
pub use major_handler::major_routes;
pub use student_handler::{student_public_routes, student_routes};
