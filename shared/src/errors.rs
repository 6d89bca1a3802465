//! Domain error types for the Microblog application

use thiserror::Error;

/// Authentication error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}

/// Post (message) error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Only the author can delete this post")]
    NotAuthor,

    #[error("A post needs a body or a link")]
    Empty,
}
