//! Post service
//!
//! Business logic for messages:
//! - Content normalization and validation
//! - Paged listing
//! - Author-only deletion

use crate::config::PostsConfig;
use crate::error::ApiError;
use crate::repositories::{CreatePost, PostRecord, PostRepository};
use chrono::Utc;
use microblog_shared::validation::{normalize_optional, validate_post};
use microblog_shared::PostError;
use sqlx::SqlitePool;
use tracing::info;

/// Resolved paging window for a list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Apply defaults and bounds to raw query values
    pub fn resolve(limit: Option<i64>, offset: Option<i64>, config: &PostsConfig) -> Self {
        let max = config.max_page_size.max(1);
        Self {
            limit: limit.unwrap_or(config.default_page_size).clamp(1, max),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Post service for business logic
pub struct PostService;

impl PostService {
    /// Publish a new post for `author_id`
    pub async fn create_post(
        pool: &SqlitePool,
        author_id: i64,
        body: Option<String>,
        link: Option<String>,
    ) -> Result<PostRecord, ApiError> {
        let body = normalize_optional(body);
        let link = normalize_optional(link);

        if body.is_none() && link.is_none() {
            return Err(PostError::Empty.into());
        }
        validate_post(body.as_deref(), link.as_deref()).map_err(ApiError::Validation)?;

        let record = PostRepository::create(
            pool,
            CreatePost {
                author_id,
                body,
                link,
                published_at: Utc::now(),
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(post_id = record.id, author_id, "Post created");

        Ok(record)
    }

    /// List posts, newest first
    pub async fn list_posts(
        pool: &SqlitePool,
        page: Page,
        author: Option<&str>,
    ) -> Result<Vec<PostRecord>, ApiError> {
        PostRepository::list(pool, page.limit, page.offset, author)
            .await
            .map_err(ApiError::Internal)
    }

    /// Get a single post
    pub async fn get_post(pool: &SqlitePool, post_id: i64) -> Result<PostRecord, ApiError> {
        PostRepository::find_by_id(pool, post_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| PostError::NotFound.into())
    }

    /// Delete a post owned by `author_id`
    ///
    /// The delete itself is conditioned on ownership; the follow-up lookup
    /// only decides which error to report.
    pub async fn delete_post(
        pool: &SqlitePool,
        author_id: i64,
        post_id: i64,
    ) -> Result<(), ApiError> {
        let deleted = PostRepository::delete_owned(pool, post_id, author_id)
            .await
            .map_err(ApiError::Internal)?;

        if deleted {
            info!(post_id, author_id, "Post deleted");
            return Ok(());
        }

        match PostRepository::find_by_id(pool, post_id)
            .await
            .map_err(ApiError::Internal)?
        {
            Some(_) => Err(PostError::NotAuthor.into()),
            None => Err(PostError::NotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repositories::UserRepository;
    use proptest::prelude::*;

    async fn test_pool() -> SqlitePool {
        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn create_user(pool: &SqlitePool, username: &str) -> i64 {
        UserRepository::create(pool, username, "hash")
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[test]
    fn test_page_defaults() {
        let page = Page::resolve(None, None, &PostsConfig::default());
        assert_eq!(page, Page { limit: 50, offset: 0 });
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Resolved pages always stay within configured bounds
        #[test]
        fn prop_page_is_bounded(limit in proptest::option::of(any::<i64>()),
                                offset in proptest::option::of(any::<i64>())) {
            let config = PostsConfig::default();
            let page = Page::resolve(limit, offset, &config);
            prop_assert!(page.limit >= 1 && page.limit <= config.max_page_size);
            prop_assert!(page.offset >= 0);
        }
    }

    #[tokio::test]
    async fn test_create_post_trims_and_stores() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice").await;

        let post = PostService::create_post(
            &pool,
            alice,
            Some("  hello world  ".to_string()),
            Some("   ".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(post.body.as_deref(), Some("hello world"));
        assert!(post.link.is_none());
        assert_eq!(post.author, "alice");
    }

    #[tokio::test]
    async fn test_create_empty_post_rejected() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice").await;

        let err = PostService::create_post(&pool, alice, None, Some(" ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_post_with_bad_link_rejected() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice").await;

        let err = PostService::create_post(&pool, alice, None, Some("not a url".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let pool = test_pool().await;
        let err = PostService::get_post(&pool, 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_author_can_delete() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let post = PostService::create_post(&pool, alice, Some("mine".to_string()), None)
            .await
            .unwrap();

        let err = PostService::delete_post(&pool, bob, post.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(PostService::get_post(&pool, post.id).await.is_ok());

        PostService::delete_post(&pool, alice, post.id).await.unwrap();

        let err = PostService::delete_post(&pool, alice, post.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_posts_respects_page() {
        let pool = test_pool().await;
        let alice = create_user(&pool, "alice").await;
        for i in 0..3 {
            PostService::create_post(&pool, alice, Some(format!("post {i}")), None)
                .await
                .unwrap();
        }

        let posts = PostService::list_posts(&pool, Page { limit: 2, offset: 0 }, None)
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].body.as_deref(), Some("post 2"));
    }
}
