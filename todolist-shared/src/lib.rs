//! # Todolist Shared Library
//!
//! This crate contains the domain types and the authorization-aware resource
//! access layer used by the Todolist API server.
//!
//! ## Module Organization
//!
//! - `models`: Task, Category, Priority and User records plus the soft-delete policy
//! - `store`: Entity Store trait with PostgreSQL and in-memory backends
//! - `auth`: JWT, password hashing, identity resolution, access-control gate, ownership
//! - `query`: Filter predicates and the task query router
//! - `service`: Resource operations (list, retrieve, create, update, delete)
//! - `db`: Connection pool and migrations
//! - `seed`: Default rows attributed to the system owner

pub mod auth;
pub mod db;
pub mod models;
pub mod query;
pub mod seed;
pub mod service;
pub mod store;

/// Current version of the Todolist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
