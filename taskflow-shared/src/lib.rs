//! # TaskFlow Shared Library
//!
//! This crate contains the types, persistence operations, and auth
//! primitives shared by the TaskFlow API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, and the request auth gate
//! - `query`: Task list query builder (filter/sort/paginate)
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod query;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
