//! Test factories for tenant documents
//!
//! Factories create valid tenant documents with unique names and tax ids,
//! useful when a test needs several distinct companies.

use std::sync::atomic::{AtomicU64, Ordering};

use tenant_topology::models::{
    BrandRef, Company, CompanyCategory, DeploymentMode, Disk, Server, ServerStatus, TenantDocument,
};

static COMPANY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Builder for a company with a valid tax id
pub struct CompanyBuilder {
    company: Company,
}

impl CompanyBuilder {
    pub fn new(name: &str) -> Self {
        let n = COMPANY_COUNTER.fetch_add(1, Ordering::SeqCst);
        let mut company = Company::new(name).with_category(CompanyCategory::Dealer);
        company.tax_id = format!("{:011}", 10_000_000_000u64 + n);
        Self { company }
    }

    pub fn licenses(mut self, licenses: u32, web_licenses: u32) -> Self {
        self.company = self.company.with_licenses(licenses, web_licenses);
        self
    }

    pub fn category(mut self, category: CompanyCategory) -> Self {
        self.company = self.company.with_category(category);
        self
    }

    pub fn brand(mut self, brand: impl Into<BrandRef>) -> Self {
        self.company = self.company.with_brand(brand);
        self
    }

    pub fn tax_id(mut self, tax_id: &str) -> Self {
        self.company.tax_id = tax_id.to_string();
        self
    }

    pub fn build(self) -> Company {
        self.company
    }
}

/// Tenant with the given companies
pub fn tenant(name: &str, mode: DeploymentMode, companies: Vec<Company>) -> TenantDocument {
    let mut document = TenantDocument::with_companies(companies).with_mode(mode);
    document.tenant_name = name.to_string();
    document
}

/// A server as the store returns it, with ids on the server and its disks
pub fn stored_server(id: &str, role: &str, status: ServerStatus, disks: &[(&str, &str)]) -> Server {
    Server {
        id: Some(id.to_string()),
        role: role.to_string(),
        status: Some(status),
        cpu: Some("4".to_string()),
        ram: Some("16".to_string()),
        disk_list: disks
            .iter()
            .enumerate()
            .map(|(i, (letter, size))| Disk {
                id: Some(format!("{}-disk-{}", id, i)),
                ..Disk::new(*letter, *size)
            })
            .collect(),
    }
}

/// Roles of a server list, in order
pub fn roles_of(servers: &[Server]) -> Vec<String> {
    servers.iter().map(|s| s.role.clone()).collect()
}
