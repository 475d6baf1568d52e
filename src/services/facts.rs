//! Fact extraction from a tenant document

use std::collections::BTreeSet;

use crate::models::{BrandCatalog, Company, DeploymentMode, DocServerType, FactRecord};
use crate::services::brands::{self, NISSAN, RENAULT};
use crate::services::sizing::calculate_scale;

/// Document server integrations, first match wins
pub const DOC_SERVER_INTEGRATIONS: &[(&str, DocServerType)] = &[
    ("arxivar_server", DocServerType::Arxivar),
    ("documentale_zucchetti", DocServerType::Zucchetti),
];

/// Integration that enables the BI server
pub const BI_INTEGRATION: &str = "bi_saas_qlik_datatransfer";

/// Derives the fact record the rules are evaluated against
pub struct FactExtractor<'a> {
    brands: &'a BrandCatalog,
}

impl<'a> FactExtractor<'a> {
    pub fn new(brands: &'a BrandCatalog) -> Self {
        Self { brands }
    }

    /// Build the fact record for a set of companies, integrations and a deployment mode
    pub fn extract(
        &self,
        companies: &[Company],
        integrations: &[String],
        mode: DeploymentMode,
    ) -> FactRecord {
        let mut facts = FactRecord {
            deployment_mode: mode,
            ..Default::default()
        };
        let mut brand_names = BTreeSet::new();
        let mut categories = BTreeSet::new();

        for company in companies {
            facts.total_licenses = facts.total_licenses.saturating_add(company.licenses);
            facts.total_web_licenses = facts.total_web_licenses.saturating_add(company.web_licenses);

            for brand_ref in &company.brands {
                let brand = self.brands.resolve(brand_ref);

                if brand.requires_proxy {
                    facts.needs_proxy = true;
                }
                if brand.requires_network_appliance && mode == DeploymentMode::HostedCloud {
                    facts.needs_network_appliance = true;
                }

                if brand.name == NISSAN {
                    facts.has_nissan = true;
                    facts.needs_vlan = true;
                }
                if brand.name == RENAULT {
                    facts.has_renault = true;
                }
                if brands::is_psa(&brand.name) {
                    facts.has_psa = true;
                }

                if !brand.name.is_empty() {
                    brand_names.insert(brand.name);
                }
            }

            if let Some(category) = company.category {
                categories.insert(category.as_str().to_string());
            }
        }

        facts.has_grouped_manufacturer = facts.has_nissan || facts.has_renault || facts.has_psa;
        facts.has_other_brand = brand_names
            .iter()
            .any(|b| b.as_str() != NISSAN && b.as_str() != RENAULT);
        facts.brand_count = brand_names.len();
        facts.brands = brand_names.into_iter().collect();
        facts.company_categories = categories.into_iter().collect();

        facts.needs_webapp = facts.total_web_licenses > 0;

        let scale = calculate_scale(facts.total_licenses, mode);
        facts.scale_required = scale.required;
        facts.scale_recommended = scale.recommended;
        facts.needs_scale = scale.required > 0;

        facts.doc_server_type = DOC_SERVER_INTEGRATIONS
            .iter()
            .find(|(code, _)| integrations.iter().any(|i| i == code))
            .map(|(_, kind)| *kind);
        facts.needs_doc_server = facts.doc_server_type.is_some();
        facts.needs_bi_server = integrations.iter().any(|i| i == BI_INTEGRATION);

        tracing::debug!(
            "Extracted facts: licenses={} web={} brands={:?} scale={}/{}",
            facts.total_licenses,
            facts.total_web_licenses,
            facts.brands,
            facts.scale_required,
            facts.scale_recommended
        );

        facts
    }
}
