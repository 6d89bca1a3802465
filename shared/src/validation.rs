//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Uses both custom validators and the `validator` crate.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use validator::ValidateUrl;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

/// Maximum length of a post body, in characters
pub const MAX_BODY_CHARS: usize = 1000;

/// Maximum length of a post link, in characters
pub const MAX_LINK_CHARS: usize = 2048;

/// Validate username format
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 32 {
        return Err("Username must be at most 32 characters".to_string());
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
        );
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Trim an optional field, mapping blank strings to `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate the content of a new post
///
/// Expects already-normalized fields (see [`normalize_optional`]).
/// A post must carry a body, a link, or both.
pub fn validate_post(body: Option<&str>, link: Option<&str>) -> Result<(), String> {
    if body.is_none() && link.is_none() {
        return Err("A post needs a body or a link".to_string());
    }
    if let Some(body) = body {
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(format!("Body must be at most {} characters", MAX_BODY_CHARS));
        }
    }
    if let Some(link) = link {
        validate_link(link)?;
    }
    Ok(())
}

/// Validate a post link: an absolute http(s) URL
pub fn validate_link(link: &str) -> Result<(), String> {
    if link.chars().count() > MAX_LINK_CHARS {
        return Err(format!("Link must be at most {} characters", MAX_LINK_CHARS));
    }
    let lower = link.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err("Link must start with http:// or https://".to_string());
    }
    if !link.validate_url() {
        return Err("Invalid link URL".to_string());
    }
    Ok(())
}
