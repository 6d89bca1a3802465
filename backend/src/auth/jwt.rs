//! JWT token issuance and validation
//!
//! Access tokens carry the username as subject and are checked for
//! signature, algorithm and expiry with no clock leeway.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use microblog_shared::AuthError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token ID
    pub jti: String,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TOKEN_EXPIRY_SECS: i64 = 365 * 24 * 60 * 60;

/// Parse an HMAC algorithm name (HS256, HS384, HS512)
pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(&name.to_ascii_uppercase())
        .map_err(|e| anyhow::anyhow!("Unknown JWT algorithm '{}': {}", name, e))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(anyhow::anyhow!(
            "Unsupported JWT algorithm {:?}: only HS256, HS384 and HS512 are allowed",
            other
        )),
    }
}

/// JWT service for token operations
///
/// Keys are derived once and shared behind `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    algorithm: Algorithm,
    access_token_expiry_secs: i64,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    pub fn new(secret: &str, algorithm: Algorithm, access_token_expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            algorithm,
            access_token_expiry_secs,
        }
    }

    /// Create from the `[jwt]` configuration section
    ///
    /// The access token lifetime must be positive and at most one year.
    pub fn from_config(config: &config::JwtConfig) -> Result<Self> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRY_SECS).contains(&config.access_token_expiry_secs) {
            anyhow::bail!(
                "JWT access token expiry must be between 1 and {} seconds, got {}",
                MAX_ACCESS_TOKEN_EXPIRY_SECS,
                config.access_token_expiry_secs
            );
        }
        Ok(Self::new(
            &config.secret,
            algorithm,
            config.access_token_expiry_secs,
        ))
    }

    /// Issue an access token for a user
    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.access_token_expiry_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Access token expiry of {}s is out of range",
                    self.access_token_expiry_secs
                )
            })?;

        let claims = Claims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate access token: {}", e))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<Claims>(token, self.keys.decoding(), &validation).map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", Algorithm::HS256, 3600)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();

        let token = service.issue("alice").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret", Algorithm::HS256, -5);

        let token = service.issue("alice").unwrap();

        assert_eq!(service.validate(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = create_test_service();
        let validator = JwtService::new("other-secret", Algorithm::HS256, 3600);

        let token = issuer.issue("alice").unwrap();

        assert_eq!(validator.validate(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let issuer = JwtService::new("test-secret", Algorithm::HS512, 3600);
        let validator = create_test_service();

        let token = issuer.issue("alice").unwrap();

        assert_eq!(validator.validate(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_empty_subject_rejected() {
        let service = create_test_service();
        let token = service.issue("").unwrap();

        assert_eq!(service.validate(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_garbage_rejected() {
        let service = create_test_service();
        assert_eq!(
            service.validate("invalid.token.here").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = create_test_service();
        let a = service.issue("alice").unwrap();
        let b = service.issue("alice").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm("hs512").unwrap(), Algorithm::HS512);
        assert!(parse_algorithm("RS256").is_err());
        assert!(parse_algorithm("none").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::AppConfig::default();
        let service = JwtService::from_config(&config.jwt).unwrap();
        assert_eq!(service.access_token_expiry_secs(), 900);
    }

    #[test]
    fn test_out_of_range_expiry_is_error_not_panic() {
        let service = JwtService::new("test-secret", Algorithm::HS256, i64::MAX / 1000);
        assert!(service.issue("alice").is_err());

        let service = JwtService::new("test-secret", Algorithm::HS256, i64::MAX);
        assert!(service.issue("alice").is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_expiry() {
        let mut config = crate::config::AppConfig::default().jwt;

        for expiry in [0, -60, MAX_ACCESS_TOKEN_EXPIRY_SECS + 1, i64::MAX / 1000] {
            config.access_token_expiry_secs = expiry;
            assert!(JwtService::from_config(&config).is_err(), "expiry {expiry} accepted");
        }

        config.access_token_expiry_secs = MAX_ACCESS_TOKEN_EXPIRY_SECS;
        let service = JwtService::from_config(&config).unwrap();
        assert!(service.issue("alice").is_ok());
    }

    #[test]
    fn test_missing_subject_rejected() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
            iat: i64,
            jti: String,
        }

        let service = create_test_service();
        let now = Utc::now().timestamp();
        let claims = NoSubject {
            exp: now + 3600,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service.validate(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_service_is_clone_cheap() {
        let service = create_test_service();
        let _cloned = service.clone();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// The subject survives issue then validate for any valid username
        #[test]
        fn prop_subject_preserved(username in "[A-Za-z0-9_.-]{3,32}") {
            let service = create_test_service();
            let token = service.issue(&username).unwrap();
            let claims = service.validate(&token).unwrap();
            prop_assert_eq!(claims.sub, username);
        }

        /// Flipping any character of the signature invalidates the token
        #[test]
        fn prop_tampered_signature_rejected(idx in 0usize..40) {
            let service = create_test_service();
            let token = service.issue("alice").unwrap();
            let sig_start = token.rfind('.').unwrap() + 1;
            let pos = sig_start + idx % (token.len() - sig_start);
            let mut bytes = token.into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'Q' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            prop_assert!(service.validate(&tampered).is_err());
        }
    }
}
