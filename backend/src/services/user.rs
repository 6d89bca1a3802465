//! User service for registration, login and profile lookup
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use microblog_shared::validation::{validate_password, validate_username};
use microblog_shared::{AuthError, AuthTokens, UserProfile};
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

/// Hash verified when the username is unknown, so a failed login costs
/// the same whether or not the account exists.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    PasswordService::hash("dummy-password-for-timing")
        .map_err(|e| error!("Failed to build dummy password hash: {}", e))
        .ok()
});

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    pub async fn register(
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, ApiError> {
        let username = username.trim();
        validate_username(username).map_err(ApiError::Validation)?;
        validate_password(password).map_err(ApiError::Validation)?;

        // Fast path; the insert below is what actually enforces uniqueness
        if UserRepository::username_exists(pool, username)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(pool, username, &password_hash)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Conflict("Username already taken".to_string()))?;

        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(Self::profile(user))
    }

    /// Login with username and password, returning an access token
    pub async fn login(
        pool: &SqlitePool,
        jwt_service: &JwtService,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = Self::authenticate(pool, username.trim(), password).await?;

        let access_token = jwt_service
            .issue(&user.username)
            .map_err(ApiError::Internal)?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.access_token_expiry_secs(),
        })
    }

    /// Get user profile
    pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<UserProfile, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(Self::profile(user))
    }

    /// Check a username/password pair against the credential store
    ///
    /// Legacy hashes are upgraded to Argon2id after a successful check.
    async fn authenticate(
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, ApiError> {
        let Some(user) = UserRepository::find_by_username(pool, username)
            .await
            .map_err(ApiError::Internal)?
        else {
            Self::burn_verify_time(password).await;
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = match PasswordService::verify_async(
            password.to_string(),
            user.password_hash.clone(),
        )
        .await
        {
            Ok(valid) => valid,
            Err(e) => {
                warn!(user_id = user.id, "Stored password hash is unusable: {}", e);
                false
            }
        };

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        if PasswordService::needs_rehash(&user.password_hash) {
            Self::upgrade_hash(pool, &user, password).await;
        }

        Ok(user)
    }

    /// Spend one Argon2 computation without checking anything
    async fn burn_verify_time(password: &str) {
        match DUMMY_HASH.as_ref() {
            Some(hash) => {
                let _ = PasswordService::verify_async(password.to_string(), hash.clone()).await;
            }
            // Hashing costs the same as verifying with default parameters
            None => {
                let _ = PasswordService::hash_async(password.to_string()).await;
            }
        }
    }

    /// Replace a legacy hash; failures are logged and do not fail the login
    async fn upgrade_hash(pool: &SqlitePool, user: &UserRecord, password: &str) {
        let upgraded = match PasswordService::hash_async(password.to_string()).await {
            Ok(hash) => UserRepository::update_password_hash(pool, user.id, &hash).await,
            Err(e) => Err(e),
        };

        match upgraded {
            Ok(_) => info!(user_id = user.id, "Upgraded legacy password hash"),
            Err(e) => warn!(user_id = user.id, "Failed to upgrade password hash: {}", e),
        }
    }

    fn profile(user: UserRecord) -> UserProfile {
        UserProfile {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}
