//! Catalog providers
//!
//! Rules, per-role server defaults and brands are owned by an external
//! catalog. [`CatalogProvider`] is the seam; [`FileCatalog`] reads local YAML
//! files and [`crate::services::StoreClient`] reads the tenant store.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::CatalogsConfig;
use crate::models::{Brand, Rule, ServerDefault};
use crate::utils::CatalogError;

/// Source of the catalogs a proposal needs
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Rule catalog, in evaluation order
    async fn rules(&self) -> Result<Vec<Rule>, CatalogError>;

    /// Per-role server defaults
    async fn server_defaults(&self) -> Result<Vec<ServerDefault>, CatalogError>;

    /// Brand catalog
    async fn brands(&self) -> Result<Vec<Brand>, CatalogError>;
}

/// Catalogs read from YAML files
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    rules_path: Option<PathBuf>,
    defaults_path: Option<PathBuf>,
    brands_path: Option<PathBuf>,
}

/// Layout of the catalog files; each holds a single top-level list
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default, alias = "server_defaults", alias = "brands")]
    rules: Vec<serde_json::Value>,
}

impl FileCatalog {
    pub fn new(
        rules_path: Option<PathBuf>,
        defaults_path: Option<PathBuf>,
        brands_path: Option<PathBuf>,
    ) -> Self {
        Self {
            rules_path,
            defaults_path,
            brands_path,
        }
    }

    /// Resolve catalog files from configuration and standard locations
    pub fn from_config(config: &CatalogsConfig) -> Self {
        Self::new(
            config.rules_file(),
            config.defaults_file(),
            config.brands_file(),
        )
    }

    fn load(path: &Option<PathBuf>, catalog: &'static str) -> Result<Vec<serde_json::Value>, CatalogError> {
        let Some(path) = path else {
            tracing::debug!("No {} catalog file configured", catalog);
            return Ok(Vec::new());
        };
        load_entries(path, catalog)
    }
}

fn load_entries(path: &Path, catalog: &'static str) -> Result<Vec<serde_json::Value>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        catalog,
        path: path.display().to_string(),
        source,
    })?;

    let value: serde_json::Value =
        serde_norway::from_str(&contents).map_err(|e| CatalogError::Parse {
            catalog,
            message: format!("{}: {}", path.display(), e),
        })?;

    catalog_entries(value, catalog)
}

/// Catalog entries from a document that is either a list or a map holding one list
pub(crate) fn catalog_entries(
    value: serde_json::Value,
    catalog: &'static str,
) -> Result<Vec<serde_json::Value>, CatalogError> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Object(_) => serde_json::from_value::<CatalogFile>(value)
            .map(|file| file.rules)
            .map_err(|e| CatalogError::Parse {
                catalog,
                message: e.to_string(),
            }),
        other => Err(CatalogError::Parse {
            catalog,
            message: format!("expected a list, found {}", other),
        }),
    }
}

/// Decode catalog entries one by one, skipping (and logging) the ones that do not fit
pub(crate) fn decode_entries<T: DeserializeOwned>(
    entries: Vec<serde_json::Value>,
    catalog: &'static str,
) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping {} catalog entry #{}: {}", catalog, idx + 1, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    async fn rules(&self) -> Result<Vec<Rule>, CatalogError> {
        Ok(decode_entries(Self::load(&self.rules_path, "rules")?, "rules"))
    }

    async fn server_defaults(&self) -> Result<Vec<ServerDefault>, CatalogError> {
        Ok(decode_entries(
            Self::load(&self.defaults_path, "server defaults")?,
            "server defaults",
        ))
    }

    async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        Ok(decode_entries(Self::load(&self.brands_path, "brands")?, "brands"))
    }
}

/// Catalogs held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub rules: Vec<Rule>,
    pub server_defaults: Vec<ServerDefault>,
    pub brands: Vec<Brand>,
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn rules(&self) -> Result<Vec<Rule>, CatalogError> {
        Ok(self.rules.clone())
    }

    async fn server_defaults(&self) -> Result<Vec<ServerDefault>, CatalogError> {
        Ok(self.server_defaults.clone())
    }

    async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        Ok(self.brands.clone())
    }
}
