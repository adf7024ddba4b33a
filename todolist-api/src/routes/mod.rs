/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and token refresh
/// - `tasks`: Task CRUD and filtered views
/// - `categories`, `priorities`: Catalog rows owned by their creators
/// - `users`: Account management

pub mod auth;
pub mod categories;
pub mod health;
pub mod priorities;
pub mod tasks;
pub mod users;
