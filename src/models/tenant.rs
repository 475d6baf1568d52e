//! Tenant document data model
//!
//! The tenant document is owned by the external store. Only the fields the
//! proposal engine reads or writes are typed; everything else is carried
//! through untouched so that a save round-trip does not drop data.

use serde::{Deserialize, Serialize};

use super::{Company, Server};

/// Integrations enabled on a fresh tenant
pub const DEFAULT_INTEGRATIONS: &[&str] = &[
    "eurotax",
    "infocar",
    "pfu",
    "download_aggiornamenti",
    "servizio_licenze",
    "collector",
    "caricamento_immagini",
    "image_gui",
];

/// How the tenant's infrastructure is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentMode {
    /// Fully hosted in the provider's cloud
    #[default]
    HostedCloud,
    /// Customer-owned cloud
    PrivateCloud,
    OnPremise,
    Hybrid,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::HostedCloud => "HOSTED_CLOUD",
            DeploymentMode::PrivateCloud => "PRIVATE_CLOUD",
            DeploymentMode::OnPremise => "ON_PREMISE",
            DeploymentMode::Hybrid => "HYBRID",
        }
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "HOSTED_CLOUD" => Ok(DeploymentMode::HostedCloud),
            "PRIVATE_CLOUD" => Ok(DeploymentMode::PrivateCloud),
            "ON_PREMISE" => Ok(DeploymentMode::OnPremise),
            "HYBRID" => Ok(DeploymentMode::Hybrid),
            other => Err(format!("Unknown deployment mode: {}", other)),
        }
    }
}

/// Infrastructure section of a tenant document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Infrastructure {
    /// Selected deployment mode
    #[serde(rename = "type", default)]
    pub mode: DeploymentMode,

    #[serde(default)]
    pub integrations: Vec<String>,

    #[serde(default)]
    pub server_list: Vec<Server>,

    /// Summary signature of `server_list`, refreshed on save
    #[serde(default)]
    pub server_hint: String,

    #[serde(default)]
    pub has_network_appliance: bool,

    #[serde(default)]
    pub has_vlan_segmentation: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A tenant (group of companies) as stored by the external store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantDocument {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub tenant_name: String,

    #[serde(default)]
    pub companies: Vec<Company>,

    #[serde(default)]
    pub infrastructure: Infrastructure,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TenantDocument {
    pub fn with_companies(companies: Vec<Company>) -> Self {
        Self {
            companies,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.infrastructure.mode = mode;
        self
    }

    pub fn with_integrations(mut self, integrations: &[&str]) -> Self {
        self.infrastructure.integrations = integrations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_servers(mut self, servers: Vec<Server>) -> Self {
        self.infrastructure.server_list = servers;
        self
    }

    pub fn servers(&self) -> &[Server] {
        &self.infrastructure.server_list
    }
}
