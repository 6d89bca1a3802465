//! Post API routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::repositories::PostRecord;
use crate::services::post::{Page, PostService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use microblog_shared::types::{CreatePostRequest, ListPostsQuery, PostListResponse, PostResponse};

/// Create post routes
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).delete(delete_post))
}

impl From<PostRecord> for PostResponse {
    fn from(record: PostRecord) -> Self {
        PostResponse {
            id: record.id,
            author: record.author,
            body: record.body,
            link: record.link,
            published_at: record.published_at,
        }
    }
}

/// GET /api/v1/posts - List posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<PostListResponse>> {
    let page = Page::resolve(query.limit, query.offset, &state.config().posts);
    let author = query
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let posts = PostService::list_posts(state.db(), page, author).await?;

    Ok(Json(PostListResponse {
        posts: posts.into_iter().map(PostResponse::from).collect(),
        limit: page.limit,
        offset: page.offset,
    }))
}

/// POST /api/v1/posts - Publish a post as the authenticated user
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let post = PostService::create_post(state.db(), auth.user_id, req.body, req.link).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// GET /api/v1/posts/:id - Get a single post
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostResponse>> {
    let post = PostService::get_post(state.db(), id).await?;
    Ok(Json(post.into()))
}

/// DELETE /api/v1/posts/:id - Delete one of the authenticated user's posts
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    PostService::delete_post(state.db(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
