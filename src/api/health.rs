//! Health check endpoints
//!
//! Liveness only proves the process answers. Readiness and the detailed report
//! also require a readable rule catalog, since no proposal can be made without one.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
    config::CatalogSource,
    services::{CatalogProvider, ProposalService},
    AppState,
};

/// Basic health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Detailed health response with component status
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub components: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub catalogs: CatalogHealth,
    pub store: ComponentStatus,
}

/// Rule and default catalogs as the proposal engine sees them
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogHealth {
    #[serde(flatten)]
    pub status: ComponentStatus,
    pub source: CatalogSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<CatalogCounts>,
}

/// Entries that survived loading; `rules` counts compiled rules only
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCounts {
    pub rules: usize,
    pub server_defaults: usize,
    pub brands: usize,
}

impl From<&ProposalService> for CatalogCounts {
    fn from(service: &ProposalService) -> Self {
        Self {
            rules: service.rule_count(),
            server_defaults: service.defaults().len(),
            brands: service.brands().len(),
        }
    }
}

/// Status of a single component
#[derive(Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
        }
    }

    /// Working, but proposals will only ever contain the baseline server
    fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            message: Some(message.into()),
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }

    fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }

    fn is_usable(&self) -> bool {
        self.status != "unhealthy"
    }
}

fn catalog_status(counts: &CatalogCounts) -> ComponentStatus {
    if counts.rules == 0 {
        ComponentStatus::degraded("no enabled rule compiled")
    } else {
        ComponentStatus::healthy()
    }
}

/// Simple health check endpoint (for load balancers)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Detailed health check endpoint
///
/// Loads every catalog the way a proposal would and reports what compiled.
/// Answers 503 when the rule catalog cannot be read.
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let catalogs = match ProposalService::load(state.catalogs.as_ref()).await {
        Ok(service) => {
            let counts = CatalogCounts::from(&service);
            CatalogHealth {
                status: catalog_status(&counts),
                source: state.config.catalogs.source,
                counts: Some(counts),
            }
        }
        Err(e) => CatalogHealth {
            status: ComponentStatus::unhealthy(e.to_string()),
            source: state.config.catalogs.source,
            counts: None,
        },
    };

    let store = if state.store.is_some() {
        ComponentStatus::healthy()
    } else {
        ComponentStatus::not_configured()
    };

    let overall_healthy = catalogs.status.is_usable() && store.is_usable();
    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = DetailedHealthResponse {
        status: if overall_healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: ComponentHealth { catalogs, store },
    };

    (status_code, Json(response))
}

/// Liveness probe (for Kubernetes)
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe (for Kubernetes)
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalogs.rules().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
