//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    ///
    /// Returns `None` when the username is already taken. The unique
    /// constraint decides, so two concurrent registrations cannot both win.
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by username (case-insensitive)
    pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if username exists
    pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)
            "#,
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Replace a user's password hash
    pub async fn update_password_hash(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1"#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
