/// Login and token refresh

use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::auth::jwt::{create_token, issue_token_pair, validate_refresh_token, Claims, TokenPair, TokenType};
use crate::auth::password::verify_password;
use crate::models::user::User;
use crate::store::EntityStore;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Checks a username and password and issues a token pair
///
/// Unknown users, deactivated users and wrong passwords all produce the
/// same error.
pub async fn login(
    store: &dyn EntityStore,
    secret: &str,
    username: &str,
    password: &str,
) -> ServiceResult<(User, TokenPair)> {
    let user = match store.users().find_by_username(username).await? {
        Some(user) if user.is_active => user,
        _ => {
            warn!(username, "Login for unknown or inactive user");
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(username, "Login with wrong password");
        return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    store.users().record_login(user.id).await?;
    let tokens = issue_token_pair(user.id, &user.username, secret)?;

    info!(user_id = user.id, username = %user.username, "User logged in");
    Ok((user, tokens))
}

/// Exchanges a refresh token for a new access token
///
/// The account must still exist and be active.
pub async fn refresh(store: &dyn EntityStore, secret: &str, refresh_token: &str) -> ServiceResult<String> {
    let claims = validate_refresh_token(refresh_token, secret)?;

    let user = store
        .users()
        .get(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ServiceError::Unauthenticated("User not found or inactive".to_string()))?;

    let access = Claims::new(user.id, user.username, TokenType::Access);
    Ok(create_token(&access, secret)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_access_token;
    use crate::auth::password::hash_password;
    use crate::models::user::CreateUser;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    async fn store_with_alice() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .users()
            .create(CreateUser {
                username: "alice".to_string(),
                password_hash: hash_password("MyP@ssw0rd!").unwrap(),
                is_staff: false,
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let (store, user) = store_with_alice().await;

        let (logged_in, tokens) = login(&store, SECRET, "alice", "MyP@ssw0rd!").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(store.users().get(user.id).await.unwrap().unwrap().last_login_at.is_some());

        let access = refresh(&store, SECRET, &tokens.refresh_token).await.unwrap();
        assert_eq!(validate_access_token(&access, SECRET).unwrap().sub, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_look_alike() {
        let (store, user) = store_with_alice().await;

        let wrong = login(&store, SECRET, "alice", "nope").await.unwrap_err();
        let unknown = login(&store, SECRET, "nobody", "MyP@ssw0rd!").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());

        store.users().deactivate(user.id).await.unwrap();
        let inactive = login(&store, SECRET, "alice", "MyP@ssw0rd!").await.unwrap_err();
        assert!(matches!(inactive, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let (store, _) = store_with_alice().await;
        let (_, tokens) = login(&store, SECRET, "alice", "MyP@ssw0rd!").await.unwrap();

        let err = refresh(&store, SECRET, &tokens.access_token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Jwt(_)));
    }
}
