//! Tenant Topology Library
//!
//! This crate provides the server-proposal engine for multi-company tenants:
//! fact extraction, sizing, rule evaluation and topology reconciliation, plus
//! the HTTP API that exposes them.

use std::sync::Arc;

use anyhow::Result;

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
use config::CatalogSource;
use services::{CatalogProvider, FileCatalog, StoreClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Rule, server-default and brand catalogs
    pub catalogs: Arc<dyn CatalogProvider>,
    /// Tenant store client (optional)
    pub store: Option<Arc<StoreClient>>,
}

impl AppState {
    /// Build the state described by a configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = match config.store {
            Some(ref store_config) => Some(Arc::new(StoreClient::new(store_config)?)),
            None => None,
        };

        let catalogs: Arc<dyn CatalogProvider> = match (config.catalogs.source, &store) {
            (CatalogSource::Store, Some(client)) => {
                tracing::info!("Reading catalogs from the tenant store");
                client.clone() as Arc<dyn CatalogProvider>
            }
            (CatalogSource::Store, None) => {
                anyhow::bail!("Catalog source 'store' requires a store section")
            }
            (CatalogSource::File, _) => {
                let catalog = FileCatalog::from_config(&config.catalogs);
                tracing::info!("Reading catalogs from local files: {:?}", catalog);
                Arc::new(catalog) as Arc<dyn CatalogProvider>
            }
        };

        Ok(Self {
            config,
            catalogs,
            store,
        })
    }

    /// State with explicit collaborators
    pub fn new(
        config: AppConfig,
        catalogs: Arc<dyn CatalogProvider>,
        store: Option<Arc<StoreClient>>,
    ) -> Self {
        Self {
            config,
            catalogs,
            store,
        }
    }
}
