//! Fact record data model

use serde::{Deserialize, Serialize};

use super::DeploymentMode;

/// Required and recommended instance counts of the scalable role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScaleCount {
    pub required: u32,
    pub recommended: u32,
}

/// Document server flavour selected by the enabled integrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocServerType {
    Arxivar,
    Zucchetti,
}

/// Facts derived from a tenant, used as rule evaluation input
///
/// Serialized with camelCase keys; rule leaves address these keys by path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRecord {
    pub total_licenses: u32,
    pub total_web_licenses: u32,
    pub deployment_mode: DeploymentMode,
    /// Distinct brand names, sorted
    pub brands: Vec<String>,
    pub brand_count: usize,
    /// Distinct company categories, sorted
    pub company_categories: Vec<String>,
    pub needs_scale: bool,
    pub needs_proxy: bool,
    pub needs_network_appliance: bool,
    pub needs_vlan: bool,
    pub needs_webapp: bool,
    pub has_nissan: bool,
    pub has_renault: bool,
    pub has_psa: bool,
    pub has_grouped_manufacturer: bool,
    pub has_other_brand: bool,
    pub needs_doc_server: bool,
    pub doc_server_type: Option<DocServerType>,
    pub needs_bi_server: bool,
    pub scale_required: u32,
    pub scale_recommended: u32,
}

impl FactRecord {
    /// JSON view used for fact lookups during rule evaluation
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}
