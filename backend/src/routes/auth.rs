//! Authentication routes
//!
//! Provides endpoints for user registration, login and the current profile.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use microblog_shared::types::{AuthTokens, LoginRequest, RegisterRequest, UserProfile};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/me", get(get_profile))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = UserService::register(state.db(), &req.username, &req.password).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Login with username and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::login(state.db(), state.jwt(), &req.username, &req.password).await?;
    Ok(Json(tokens))
}

/// OAuth2 password-flow token endpoint (form-encoded)
///
/// POST /api/v1/auth/token
async fn token(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::login(state.db(), state.jwt(), &req.username, &req.password).await?;
    Ok(Json(tokens))
}

/// Get current user profile (requires authentication)
///
/// GET /api/v1/auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.db(), auth_user.user_id).await?;
    Ok(Json(profile))
}
