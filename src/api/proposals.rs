//! Proposal API endpoints

use axum::{extract::State, routing::post, Json, Router};

use crate::{
    models::{
        Proposal, ProposalRequest, ScaleCount, SizingRequest, SummaryRequest, SummaryResponse,
        TopologySummary,
    },
    services::{calculate_scale, roles, ProposalService},
    utils::AppResult,
    AppState,
};

/// Create routes for proposal endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_proposal))
        .route("/sizing", post(preview_sizing))
        .route("/summary", post(summarize))
}

/// Compute the server topology for a tenant document
async fn create_proposal(
    State(state): State<AppState>,
    Json(payload): Json<ProposalRequest>,
) -> AppResult<Json<Proposal>> {
    let mode = payload
        .deployment_mode
        .unwrap_or(payload.document.infrastructure.mode);

    let service = ProposalService::load(state.catalogs.as_ref()).await?;
    Ok(Json(service.propose(&payload.document, mode)))
}

/// Scalable server counts for a license total
async fn preview_sizing(
    State(state): State<AppState>,
    Json(payload): Json<SizingRequest>,
) -> Json<ScaleCount> {
    let mode = payload
        .deployment_mode
        .unwrap_or(state.config.proposal.default_mode);
    Json(calculate_scale(payload.total_licenses, mode))
}

/// Displayed servers, their summary signature and tenant totals
async fn summarize(Json(payload): Json<SummaryRequest>) -> Json<SummaryResponse> {
    let document = payload.document;
    let servers = document.displayed_servers(payload.include_recommended);

    Json(SummaryResponse {
        server_hint: roles::server_hint(&servers),
        summary: TopologySummary::from_document(&document),
        available_roles: roles::available_roles(document.servers()),
        servers,
    })
}
