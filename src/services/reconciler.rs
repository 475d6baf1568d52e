//! Topology reconciliation
//!
//! Merges the desired role set with the previously saved server list. User
//! edits (CPU, RAM, non-system disks) and store identifiers survive every
//! recompute; only the system drive size tracks the current defaults.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{
    BrandCatalog, Company, Disk, Overrides, Server, ServerDefault, ServerStatus, SYSTEM_DRIVE,
};
use crate::services::brands::{self, NISSAN};
use crate::services::roles::{self, CX, DB};

/// System drive size when the catalog has no layout for the baseline role
pub const BASELINE_FALLBACK_SIZE: &str = "150";

/// System drive size when the catalog has no layout for any other role
pub const FALLBACK_SIZE: &str = "100GB";

/// Characters stripped from company names in composite role tokens
static COMPANY_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Company name as used in a composite role token
pub fn sanitize_company_name(name: &str) -> String {
    COMPANY_SUFFIX_REGEX.replace_all(name, "").into_owned()
}

/// Composite role token for a brand label and company
pub fn composite_role(label: &str, company_name: &str) -> String {
    format!("{}_{}_{}", CX, label, sanitize_company_name(company_name))
}

/// Reconciles roles against an existing server list and the defaults catalog
pub struct TopologyReconciler<'a> {
    existing: &'a [Server],
    by_role: HashMap<&'a str, &'a Server>,
    defaults: HashMap<&'a str, &'a ServerDefault>,
}

impl<'a> TopologyReconciler<'a> {
    /// Index the existing servers and defaults once for this invocation
    pub fn new(existing: &'a [Server], defaults: &'a [ServerDefault]) -> Self {
        let mut by_role = HashMap::new();
        for server in existing {
            by_role.entry(server.role.as_str()).or_insert(server);
        }

        let mut by_base = HashMap::new();
        for default in defaults {
            by_base.entry(default.role.as_str()).or_insert(default);
        }

        Self {
            existing,
            by_role,
            defaults: by_base,
        }
    }

    /// Existing server carrying exactly this role token
    pub fn existing(&self, role: &str) -> Option<&'a Server> {
        self.by_role.get(role).copied()
    }

    /// Catalog default for the base role of a token
    pub fn default_for(&self, role: &str) -> Option<&'a ServerDefault> {
        self.defaults.get(roles::base_role(role)).copied()
    }

    /// Create or update the server for a role
    pub fn reconcile(&self, role: &str, overrides: &Overrides) -> Server {
        self.reconcile_with(role, self.existing(role), overrides)
    }

    fn reconcile_with(&self, role: &str, existing: Option<&Server>, overrides: &Overrides) -> Server {
        let default = self.default_for(role);

        let status = overrides
            .status
            .or_else(|| existing.and_then(|s| s.status))
            .or_else(|| default.and_then(|d| d.default_status))
            .unwrap_or(ServerStatus::Required);

        let cpu = existing
            .and_then(|s| s.cpu.clone())
            .or_else(|| overrides.cpu.clone())
            .or_else(|| default.and_then(|d| d.default_cpu.clone()));

        let ram = existing
            .and_then(|s| s.ram.clone())
            .or_else(|| overrides.ram.clone())
            .or_else(|| default.and_then(|d| d.default_ram.clone()));

        let system_size = default
            .and_then(ServerDefault::system_drive_size)
            .unwrap_or_else(|| fallback_size(role))
            .to_string();

        let disk_list = match existing {
            Some(server) if server.has_valid_disks() => {
                with_system_size(server.disk_list.iter().cloned(), &system_size)
            }
            Some(server) => {
                tracing::warn!(
                    "Server '{}' has an invalid disk list, resetting to a single system drive",
                    server.role
                );
                vec![Disk::new(SYSTEM_DRIVE, system_size)]
            }
            None => overrides
                .disk_list
                .as_deref()
                .filter(|disks| !disks.is_empty())
                .or_else(|| {
                    default
                        .map(|d| d.default_disk_list.as_slice())
                        .filter(|disks| !disks.is_empty())
                })
                .map(|disks| with_system_size(fresh_disks(disks), &system_size))
                .unwrap_or_else(|| vec![Disk::new(SYSTEM_DRIVE, system_size)]),
        };

        Server {
            id: existing.and_then(|s| s.id.clone()),
            role: role.to_string(),
            status: Some(status),
            cpu,
            ram,
            disk_list,
        }
    }

    /// Every existing baseline server carried forward, or one synthesized from defaults
    pub fn baseline(&self) -> Vec<Server> {
        let mut servers: Vec<Server> = self
            .existing
            .iter()
            .filter(|s| s.role == DB)
            .map(|s| self.reconcile_with(DB, Some(s), &Overrides::default()))
            .collect();

        if servers.is_empty() {
            servers.push(self.reconcile_with(DB, None, &Overrides::default()));
        }

        servers
    }

    /// Scalable instances `SCALE-1..=recommended`; the first `required` are required
    pub fn expand_scale(&self, required: u32, recommended: u32, overrides: &Overrides) -> Vec<Server> {
        (0..recommended)
            .map(|i| {
                let status = if i < required {
                    ServerStatus::Required
                } else {
                    ServerStatus::Recommended
                };
                self.reconcile(
                    &roles::scale_role(i + 1),
                    &overrides.clone().with_status(status),
                )
            })
            .collect()
    }

    /// One composite server per company and brand label.
    ///
    /// Grouped manufacturers produce a single server per group for the whole
    /// tenant; NISSAN never gets one.
    pub fn expand_composite(
        &self,
        companies: &[Company],
        brands: &BrandCatalog,
        overrides: &Overrides,
    ) -> Vec<Server> {
        let mut seen_groups = HashSet::new();
        let mut seen_roles = HashSet::new();
        let mut servers = Vec::new();

        for company in companies {
            for brand_ref in &company.brands {
                let brand = brands.resolve(brand_ref);
                if brand.name.is_empty() || brand.name == NISSAN {
                    continue;
                }

                let label = brands::group_for(&brand.name)
                    .map(str::to_string)
                    .unwrap_or(brand.name);
                if brands::is_group(&label) && !seen_groups.insert(label.clone()) {
                    continue;
                }

                let role = composite_role(&label, &company.name);
                if seen_roles.insert(role.clone()) {
                    servers.push(self.reconcile(&role, overrides));
                }
            }
        }

        servers
    }
}

fn fallback_size(role: &str) -> &'static str {
    if roles::base_role(role) == DB {
        BASELINE_FALLBACK_SIZE
    } else {
        FALLBACK_SIZE
    }
}

/// Copy a disk layout for a server that has never been stored
fn fresh_disks(disks: &[Disk]) -> impl Iterator<Item = Disk> + '_ {
    disks.iter().map(|d| Disk {
        id: None,
        ..d.clone()
    })
}

/// The system drive always carries the catalog size, whatever layout it came from
fn with_system_size(disks: impl Iterator<Item = Disk>, system_size: &str) -> Vec<Disk> {
    disks
        .map(|disk| {
            if disk.is_system() {
                Disk {
                    size: system_size.to_string(),
                    ..disk
                }
            } else {
                disk
            }
        })
        .collect()
}
