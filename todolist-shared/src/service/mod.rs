/// Resource services
///
/// Each operation resolves the row, asks the access-control gate, validates
/// references and only then writes through the Entity Store. Transport code
/// calls these functions and maps [`ServiceError`] to a response.
///
/// - [`resources`]: list/retrieve/create/update/destroy for any [`crate::models::Resource`]
/// - [`tasks`]: task writes with reference validation and the filtered views
/// - [`users`]: account management
/// - [`sessions`]: login and token refresh

pub mod resources;
pub mod sessions;
pub mod tasks;
pub mod users;

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Denied or hidden by the gate
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// A supplied field value is unacceptable
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },

    /// Credentials or token rejected
    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
