//! Request and response types for the Microblog API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication Types
// ============================================================================

/// Authentication tokens returned on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
///
/// Also used for the form-encoded `/auth/token` endpoint, whose field
/// names follow the OAuth2 password flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Post Types
// ============================================================================

/// Create post request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Post response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Query parameters for listing posts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Only return posts by this username
    pub author: Option<String>,
}

/// Post list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_request_fields_optional() {
        let req: CreatePostRequest = serde_json::from_str(r#"{"body":"hello"}"#).unwrap();
        assert_eq!(req.body.as_deref(), Some("hello"));
        assert!(req.link.is_none());
    }

    #[test]
    fn test_post_response_omits_missing_link() {
        let post = PostResponse {
            id: 1,
            author: "alice".to_string(),
            body: Some("hi".to_string()),
            link: None,
            published_at: Utc::now(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("link").is_none());
        assert_eq!(json["author"], "alice");
    }
}
