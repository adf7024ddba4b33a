/// Bearer authentication and the resolved identity
///
/// The transport layer hands the `Authorization` header to [`authenticate`],
/// which validates the JWT, reloads the user from the store and returns an
/// [`AuthContext`]. Handlers receive the context through request extensions.
///
/// The user is reloaded on every request so that a revoked staff flag or a
/// deactivated account takes effect immediately, not when the token expires.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use todolist_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, staff: {}", auth.username, auth.is_staff())
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::User;
use crate::store::EntityStore;

/// Role of an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted visibility and mutation, exclusive hard delete
    Staff,

    /// Limited to the identity's own resources
    NonStaff,
}

impl Role {
    pub fn from_staff_flag(is_staff: bool) -> Self {
        if is_staff {
            Role::Staff
        } else {
            Role::NonStaff
        }
    }
}

/// Authenticated identity added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username, the ownership key recorded in `created_by`
    pub username: String,

    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Creates the context for a stored user
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, user.username.clone(), user.role())
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Invalid authorization header format
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject no longer exists or is deactivated
    #[error("User not found or inactive")]
    InactiveUser,

    /// Store lookup failed
    #[error("Store error: {0}")]
    StoreError(String),
}

/// Resolves the `Authorization: Bearer <token>` header to an identity
///
/// # Errors
///
/// - `MissingCredentials` if the header is absent
/// - `InvalidFormat` if it is not a bearer token
/// - `InvalidToken` if the JWT fails validation or is not an access token
/// - `InactiveUser` if the subject is unknown or deactivated
pub async fn authenticate(
    store: &dyn EntityStore,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    // Extract Authorization header
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = store
        .users()
        .get(claims.sub)
        .await
        .map_err(|e| AuthError::StoreError(e.to_string()))?
        .filter(|user| user.is_active && user.username == claims.username)
        .ok_or(AuthError::InactiveUser)?;

    debug!(user_id = user.id, username = %user.username, staff = user.is_staff, "Request authenticated");
    Ok(AuthContext::from_user(&user))
}
