//! Tenant store client
//!
//! The external store owns tenant documents and the rule, server-default and
//! brand catalogs. This client covers the read/write contract the proposal
//! engine relies on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::models::{Brand, Rule, ServerDefault, TenantDocument};
use crate::services::catalog::{catalog_entries, decode_entries, CatalogProvider};
use crate::utils::CatalogError;

/// HTTP client for the tenant store
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
}

/// Response of the duplicate tax-id check
#[derive(Debug, Deserialize)]
struct DuplicateResponse {
    #[serde(default)]
    duplicate: bool,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        info!("Initializing store client for {}", config.url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ==================== Tenant Endpoints ====================

    /// Fetch a tenant document
    pub async fn get_tenant(&self, id: &str) -> Result<Option<TenantDocument>> {
        let url = format!("{}/groups/{}", self.base_url, urlencoding::encode(id));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch tenant")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Create a tenant document; returns the stored document
    pub async fn create_tenant(&self, document: &TenantDocument) -> Result<TenantDocument> {
        let url = format!("{}/groups", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(document)
            .send()
            .await
            .context("Failed to create tenant")?;

        self.handle_response(response).await
    }

    /// Replace a tenant document; returns the stored document
    pub async fn update_tenant(&self, id: &str, document: &TenantDocument) -> Result<TenantDocument> {
        let url = format!("{}/groups/{}", self.base_url, urlencoding::encode(id));

        let response = self
            .client
            .put(&url)
            .json(document)
            .send()
            .await
            .context("Failed to update tenant")?;

        self.handle_response(response).await
    }

    /// Ask the store whether another company already uses a tax id
    pub async fn check_duplicate_tax_id(&self, tax_id: &str) -> Result<bool> {
        let url = format!(
            "{}/companies/check-duplicate/{}",
            self.base_url,
            urlencoding::encode(tax_id)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to check duplicate tax id")?;

        let body: DuplicateResponse = self.handle_response(response).await?;
        Ok(body.duplicate)
    }

    // ==================== Catalog Endpoints ====================

    async fn fetch_catalog(
        &self,
        path: &str,
        catalog: &'static str,
    ) -> Result<Vec<serde_json::Value>, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching {} catalog from {}", catalog, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                catalog,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                catalog,
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response.json().await.map_err(|e| CatalogError::Parse {
            catalog,
            message: e.to_string(),
        })?;

        catalog_entries(value, catalog)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;
            serde_json::from_str::<T>(&body).with_context(|| {
                let truncated = if body.len() > 500 {
                    format!("{}... (truncated)", body.chars().take(500).collect::<String>())
                } else {
                    body
                };
                format!("Failed to parse response JSON: {}", truncated)
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Request failed with status {}: {}", status, body);
        }
    }
}

#[async_trait]
impl CatalogProvider for StoreClient {
    async fn rules(&self) -> Result<Vec<Rule>, CatalogError> {
        let entries = self.fetch_catalog("/rules", "rules").await?;
        Ok(decode_entries(entries, "rules"))
    }

    async fn server_defaults(&self) -> Result<Vec<ServerDefault>, CatalogError> {
        let entries = self.fetch_catalog("/serverdefaults", "server defaults").await?;
        Ok(decode_entries(entries, "server defaults"))
    }

    async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        let entries = self.fetch_catalog("/brandsadm", "brands").await?;
        Ok(decode_entries(entries, "brands"))
    }
}
