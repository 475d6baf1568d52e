//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{BrandCatalog, CompanyCategory, DeploymentMode, TenantDocument};
use crate::services::brands::NISSAN;

/// Italian VAT number: exactly eleven digits
static TAX_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Validate a company tax id
pub fn validate_tax_id(tax_id: &str) -> bool {
    TAX_ID_REGEX.is_match(tax_id)
}

/// Validate a tenant document before it is saved.
///
/// Returns one message per problem found; an empty list means the document is valid.
pub fn validate_document(document: &TenantDocument, brands: &BrandCatalog) -> Vec<String> {
    let mut errors = Vec::new();

    if document.companies.is_empty() {
        errors.push("At least one company is required".to_string());
        return errors;
    }

    let hosted = document.infrastructure.mode == DeploymentMode::HostedCloud;

    for (idx, company) in document.companies.iter().enumerate() {
        let position = idx + 1;

        if hosted
            && company.category == Some(CompanyCategory::Dealer)
            && company
                .brands
                .iter()
                .any(|b| brands.resolve(b).name == NISSAN)
        {
            errors.push(format!(
                "Company #{}: a NISSAN dealer is not allowed in {} mode",
                position,
                DeploymentMode::HostedCloud.as_str()
            ));
        }

        if company.name.trim().is_empty() {
            errors.push(format!("Company #{}: name is required", position));
        }

        if !validate_tax_id(&company.tax_id) {
            errors.push(format!("Company #{}: tax id must be 11 digits", position));
        }
    }

    errors
}
