//! Role tokens and the helpers built on them

use crate::models::{Server, ServerStatus, TenantDocument, TopologySummary};

/// Baseline (database tier) role
pub const DB: &str = "DB";
/// Scalable role; instances are `SCALE-1`, `SCALE-2`, ...
pub const SCALE: &str = "SCALE";
/// Cross-integration role; instances are `CX_{label}_{company}`
pub const CX: &str = "CX";
pub const WEBAPP: &str = "WEBAPP";
pub const BI: &str = "BI";
pub const DOC: &str = "DOC";
pub const PROXY: &str = "PROXY";

/// Singleton roles in the order they are applied to a proposal
pub const SINGLETON_ROLES: [&str; 4] = [WEBAPP, BI, DOC, PROXY];

/// Roles offered for manual addition, in display order
const MANUAL_ROLES: [&str; 5] = [DB, WEBAPP, PROXY, DOC, BI];

/// Separator of the summary signature
pub const HINT_SEPARATOR: &str = "+";

/// Role token of the n-th scalable instance (1-based)
pub fn scale_role(n: u32) -> String {
    format!("{}-{}", SCALE, n)
}

/// Instance number of a scalable role token
pub fn scale_index(role: &str) -> Option<u32> {
    role.strip_prefix(SCALE)?.strip_prefix('-')?.parse().ok()
}

fn is_composite(role: &str) -> bool {
    role == CX || role.starts_with("CX_")
}

/// Base role used to look up catalog defaults
pub fn base_role(role: &str) -> &str {
    if role == SCALE || scale_index(role).is_some() {
        SCALE
    } else if is_composite(role) {
        CX
    } else {
        role
    }
}

/// Canonical label of a role in the summary signature
pub fn summary_label(role: &str) -> &str {
    base_role(role)
}

/// Summary signature: canonical labels, first-seen order, joined with `+`
pub fn server_hint(servers: &[Server]) -> String {
    let mut labels: Vec<&str> = Vec::new();
    for server in servers {
        let label = summary_label(&server.role);
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels.join(HINT_SEPARATOR)
}

/// Servers shown to the user; recommended ones only when asked for
pub fn displayed_servers(servers: &[Server], include_recommended: bool) -> Vec<Server> {
    servers
        .iter()
        .filter(|s| {
            include_recommended || s.status.unwrap_or_default() == ServerStatus::Required
        })
        .cloned()
        .collect()
}

/// Roles that can still be added by hand: missing singletons, then the next scalable instance
pub fn available_roles(servers: &[Server]) -> Vec<String> {
    let used: Vec<String> = servers
        .iter()
        .map(|s| s.role.trim().to_uppercase())
        .filter(|r| !r.is_empty())
        .collect();

    let mut roles: Vec<String> = MANUAL_ROLES
        .iter()
        .filter(|r| !used.iter().any(|u| u == *r))
        .map(|r| r.to_string())
        .collect();

    let max_scale = used.iter().filter_map(|r| scale_index(r)).max().unwrap_or(0);
    roles.push(scale_role(max_scale + 1));

    roles
}

impl TopologySummary {
    /// Totals over a tenant document
    pub fn from_document(document: &TenantDocument) -> Self {
        let infra = &document.infrastructure;
        Self {
            deployment_mode: infra.mode,
            companies: document.companies.len(),
            integrations: infra.integrations.len(),
            brands: document.companies.iter().map(|c| c.brands.len()).sum(),
            licenses: document
                .companies
                .iter()
                .fold(0u32, |acc, c| acc.saturating_add(c.licenses)),
            web_licenses: document
                .companies
                .iter()
                .fold(0u32, |acc, c| acc.saturating_add(c.web_licenses)),
            servers: infra.server_list.len(),
            disks: infra.server_list.iter().map(|s| s.disk_list.len()).sum(),
            has_network_appliance: infra.has_network_appliance,
            has_vlan_segmentation: infra.has_vlan_segmentation,
        }
    }
}
