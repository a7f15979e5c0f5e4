//! Shared transport types.

pub mod response;

pub use response::{ApiResponse, Created};
