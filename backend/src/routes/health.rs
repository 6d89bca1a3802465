//! Health endpoints
//!
//! `/health/ready` answers 503 until the database is reachable and migrated.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Alive,
    Ready,
    NotReady,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<ReadinessChecks>,
}

impl HealthResponse {
    fn plain(status: ServiceStatus) -> Self {
        Self {
            status,
            version: VERSION,
            checks: None,
        }
    }
}

/// Outcome of each readiness dependency
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: Check,
    pub schema: Check,
}

impl ReadinessChecks {
    fn passed(&self) -> bool {
        self.database.ok && self.schema.ok
    }
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<anyhow::Result<()>> for Check {
    fn from(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self { ok: true, error: None },
            Err(e) => Self {
                ok: false,
                error: Some(e.to_string()),
            },
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::plain(ServiceStatus::Healthy))
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::plain(ServiceStatus::Alive))
}

/// Ping the database, then confirm the posts and users tables exist
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = Check::from(db::health_check(state.db()).await);
    // No point inspecting the schema of a database we cannot reach
    let schema = if database.ok {
        Check::from(db::schema_check(state.db()).await)
    } else {
        Check {
            ok: false,
            error: Some("database unreachable".to_string()),
        }
    };

    let checks = ReadinessChecks { database, schema };
    let (code, status) = if checks.passed() {
        (StatusCode::OK, ServiceStatus::Ready)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ServiceStatus::NotReady)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: VERSION,
            checks: Some(checks),
        }),
    )
}
