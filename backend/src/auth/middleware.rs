//! Authentication extractor
//!
//! Resolves a Bearer token into the principal that post operations are
//! scoped to.

use crate::error::ApiError;
use crate::repositories::UserRepository;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use microblog_shared::AuthError;
use tracing::debug;

/// Authenticated user extracted from JWT
///
/// The token must be valid and unexpired, and its subject must still
/// exist in the credential store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = bearer_token(auth_header).ok_or(AuthError::InvalidToken)?;

        let claims = app_state.jwt().validate(token)?;

        let user = UserRepository::find_by_username(app_state.db(), &claims.sub)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| {
                debug!(subject = %claims.sub, "Token subject no longer exists");
                ApiError::from(AuthError::InvalidToken)
            })?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
        })
    }
}

/// Extract the credentials of a `Bearer` authorization header
///
/// The scheme name is matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("BEARER  abc.def.ghi "), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_headers_rejected() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_auth_user_debug() {
        let user = AuthUser {
            user_id: 1,
            username: "alice".to_string(),
        };
        let debug_str = format!("{:?}", user);
        assert!(debug_str.contains("AuthUser"));
        assert!(debug_str.contains("alice"));
    }
}
