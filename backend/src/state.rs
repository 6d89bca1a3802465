//! Application state management
//!
//! Shared state passed to all request handlers via Axum's state
//! extraction. Every field is cheap to clone.

use crate::auth::JwtService;
use crate::config::AppConfig;
use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the JWT keys once; fails on an unsupported JWT algorithm.
    pub fn new(db: SqlitePool, config: AppConfig) -> Result<Self> {
        let jwt = JwtService::from_config(&config.jwt)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
        })
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
