//! Tenant API endpoints
//!
//! Tenant documents live in the external store; these endpoints add the
//! baseline and save preparation the proposal engine expects around it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{
    models::{BrandCatalog, TenantDocument, ValidationReport},
    services::{CatalogProvider, StoreClient},
    utils::{validation::validate_document, AppError, AppResult},
    AppState,
};

/// Create routes for tenant endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tenant))
        .route("/draft", get(draft_tenant))
        .route("/validate", post(validate_tenant))
        .route("/{id}", get(get_tenant).put(update_tenant))
}

/// Create routes for company endpoints
pub fn company_routes() -> Router<AppState> {
    Router::new().route("/check-duplicate/{tax_id}", get(check_duplicate))
}

/// Duplicate tax-id check result
#[derive(Debug, Serialize)]
pub struct DuplicateCheckResponse {
    pub duplicate: bool,
}

fn require_store(state: &AppState) -> AppResult<Arc<StoreClient>> {
    state
        .store
        .clone()
        .ok_or_else(|| AppError::service_unavailable("Tenant store is not configured"))
}

async fn load_brands(catalogs: &dyn CatalogProvider) -> BrandCatalog {
    match catalogs.brands().await {
        Ok(brands) => BrandCatalog::new(brands),
        Err(e) => {
            tracing::warn!("Brand catalog unavailable, validating without it: {}", e);
            BrandCatalog::default()
        }
    }
}

async fn ensure_valid(state: &AppState, document: &TenantDocument) -> AppResult<()> {
    let brands = load_brands(state.catalogs.as_ref()).await;
    let errors = validate_document(document, &brands);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors.join("; ")))
    }
}

/// Reject companies whose tax id the store already knows.
///
/// Companies that already have an identifier were checked when first saved.
async fn ensure_unique_tax_ids(store: &StoreClient, document: &TenantDocument) -> AppResult<()> {
    for company in document.companies.iter().filter(|c| c.id.is_none()) {
        let duplicate = store
            .check_duplicate_tax_id(&company.tax_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check duplicate tax id: {:#}", e);
                AppError::Store("Failed to check duplicate tax id".to_string())
            })?;

        if duplicate {
            return Err(AppError::conflict(format!(
                "Company '{}': tax id {} is already registered",
                company.name, company.tax_id
            )));
        }
    }
    Ok(())
}

/// A new tenant with one empty company and a baseline server
async fn draft_tenant(State(state): State<AppState>) -> Json<TenantDocument> {
    let defaults = state.catalogs.server_defaults().await.unwrap_or_else(|e| {
        tracing::warn!("Server defaults unavailable, using fallbacks: {}", e);
        Vec::new()
    });
    let document = TenantDocument::draft(&defaults).with_mode(state.config.proposal.default_mode);
    Json(document)
}

/// Validate a tenant document without storing it
async fn validate_tenant(
    State(state): State<AppState>,
    Json(document): Json<TenantDocument>,
) -> Json<ValidationReport> {
    let brands = load_brands(state.catalogs.as_ref()).await;
    Json(ValidationReport::from_errors(validate_document(&document, &brands)))
}

/// Get a tenant, with a baseline server added when it has none
async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TenantDocument>> {
    let store = require_store(&state)?;

    let tenant = store.get_tenant(&id).await.map_err(|e| {
        tracing::error!("Failed to get tenant {}: {:#}", id, e);
        AppError::Store("Failed to get tenant".to_string())
    })?;

    let Some(mut document) = tenant else {
        return Err(AppError::not_found("Tenant not found"));
    };

    let defaults = state.catalogs.server_defaults().await.unwrap_or_else(|e| {
        tracing::warn!("Server defaults unavailable, using fallbacks: {}", e);
        Vec::new()
    });
    document.ensure_baseline(&defaults);

    Ok(Json(document))
}

/// Validate and store a new tenant
async fn create_tenant(
    State(state): State<AppState>,
    Json(mut document): Json<TenantDocument>,
) -> AppResult<(StatusCode, Json<TenantDocument>)> {
    let store = require_store(&state)?;
    ensure_valid(&state, &document).await?;
    ensure_unique_tax_ids(&store, &document).await?;

    document.prepare_for_save();
    let created = store.create_tenant(&document).await.map_err(|e| {
        tracing::error!("Failed to create tenant: {:#}", e);
        AppError::Store("Failed to create tenant".to_string())
    })?;

    tracing::info!("Created tenant '{}'", created.tenant_name);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Validate and replace a stored tenant
async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut document): Json<TenantDocument>,
) -> AppResult<Json<TenantDocument>> {
    let store = require_store(&state)?;
    ensure_valid(&state, &document).await?;
    ensure_unique_tax_ids(&store, &document).await?;

    document.prepare_for_save();
    let updated = store.update_tenant(&id, &document).await.map_err(|e| {
        tracing::error!("Failed to update tenant {}: {:#}", id, e);
        AppError::Store("Failed to update tenant".to_string())
    })?;

    Ok(Json(updated))
}

/// Ask the store whether a tax id is already in use
async fn check_duplicate(
    State(state): State<AppState>,
    Path(tax_id): Path<String>,
) -> AppResult<Json<DuplicateCheckResponse>> {
    let store = require_store(&state)?;

    let duplicate = store.check_duplicate_tax_id(&tax_id).await.map_err(|e| {
        tracing::error!("Failed to check duplicate tax id: {:#}", e);
        AppError::Store("Failed to check duplicate tax id".to_string())
    })?;

    Ok(Json(DuplicateCheckResponse { duplicate }))
}
