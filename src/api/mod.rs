//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod health;
mod proposals;
mod tenants;

pub use health::*;
pub use tenants::DuplicateCheckResponse;

/// API routes, mounted under `/api/v1`
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // Proposal engine
        .nest("/proposals", proposals::routes())
        // Tenant store pass-through
        .nest("/tenants", tenants::routes())
        .nest("/companies", tenants::company_routes())
}
