/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: Access/refresh token issuing and validation
/// - [`middleware`]: Bearer authentication and the resolved [`middleware::AuthContext`]
/// - [`ownership`]: Owner lookup and reference validation
/// - [`authorization`]: The access-control gate
///
/// # Example
///
/// ```no_run
/// use todolist_shared::auth::jwt::{create_token, Claims, TokenType};
/// use todolist_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_Passw0rd")?;
/// assert!(verify_password("user_Passw0rd", &hash)?);
///
/// let claims = Claims::new(1, "alice", TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
