//! Commands module - CLI command implementations.

pub mod migrate;
pub mod seed_admin;
pub mod serve;
