//! Proposal data model

use serde::{Deserialize, Serialize};

use super::{DeploymentMode, Disk, FactRecord, Server, ServerStatus, TenantDocument};

/// Engine-supplied hints for a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub status: Option<ServerStatus>,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
    /// Only used when the server does not exist yet
    #[serde(default)]
    pub disk_list: Option<Vec<Disk>>,
}

impl Overrides {
    pub fn with_status(mut self, status: ServerStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A request, produced by a matching rule, to add a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Name of the rule that produced the intent
    pub rule: String,
    /// Role token from the event
    pub role: String,
    pub overrides: Overrides,
}

/// Result of a proposal run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub server_list: Vec<Server>,
    pub server_hint: String,
    pub has_network_appliance: bool,
    pub has_vlan_segmentation: bool,
    pub has_proxy: bool,
    /// Facts the rules were evaluated against
    pub facts: FactRecord,
}

/// Request body for a proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub document: TenantDocument,
    /// Overrides the document's own deployment mode
    #[serde(default)]
    pub deployment_mode: Option<DeploymentMode>,
}

/// Request body for a sizing preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingRequest {
    pub total_licenses: u32,
    /// Falls back to the configured default mode
    #[serde(default)]
    pub deployment_mode: Option<DeploymentMode>,
}

/// Request body for a topology summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub document: TenantDocument,
    #[serde(default = "default_include_recommended")]
    pub include_recommended: bool,
}

fn default_include_recommended() -> bool {
    true
}

/// Aggregate figures for a tenant's topology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySummary {
    pub deployment_mode: DeploymentMode,
    pub companies: usize,
    pub integrations: usize,
    pub brands: usize,
    pub licenses: u32,
    pub web_licenses: u32,
    pub servers: usize,
    pub disks: usize,
    pub has_network_appliance: bool,
    pub has_vlan_segmentation: bool,
}

/// Response body for a topology summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub server_hint: String,
    pub servers: Vec<Server>,
    pub summary: TopologySummary,
    pub available_roles: Vec<String>,
}

/// Result of validating a tenant document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
