//! Post repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Post record from database, joined with its author's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub author_id: i64,
    pub author: String,
    pub body: Option<String>,
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: i64,
    pub body: Option<String>,
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
}

const SELECT_POST: &str = r#"
    SELECT p.id, p.author_id, u.username AS author, p.body, p.link, p.published_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// Post repository
pub struct PostRepository;

impl PostRepository {
    /// Create a new post
    pub async fn create(pool: &SqlitePool, input: CreatePost) -> Result<PostRecord> {
        let mut tx = pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (author_id, body, link, published_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(input.author_id)
        .bind(&input.body)
        .bind(&input.link)
        .bind(input.published_at)
        .fetch_one(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, PostRecord>(&format!("{SELECT_POST} WHERE p.id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// List posts, newest first
    ///
    /// Posts published at the same instant are ordered by id, highest first.
    pub async fn list(
        pool: &SqlitePool,
        limit: i64,
        offset: i64,
        author: Option<&str>,
    ) -> Result<Vec<PostRecord>> {
        let records = sqlx::query_as::<_, PostRecord>(&format!(
            r#"{SELECT_POST}
            WHERE (?1 IS NULL OR u.username = ?1)
            ORDER BY p.published_at DESC, p.id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(author)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Find post by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<PostRecord>> {
        let record = sqlx::query_as::<_, PostRecord>(&format!("{SELECT_POST} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// Delete a post if, and only if, it belongs to `author_id`
    pub async fn delete_owned(pool: &SqlitePool, id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM posts WHERE id = ?1 AND author_id = ?2"#)
            .bind(id)
            .bind(author_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
