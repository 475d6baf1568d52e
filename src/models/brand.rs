//! Brand data model

use serde::{Deserialize, Serialize};

/// A vehicle manufacturer brand from the brand catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    /// Catalog identifier
    #[serde(default, alias = "_id")]
    pub id: Option<String>,

    /// Short brand code
    #[serde(default)]
    pub code: Option<String>,

    /// Display description (e.g. "PEUGEOT")
    #[serde(default)]
    pub description: String,

    /// Brand integration needs a reverse proxy in front of the tenant
    #[serde(default)]
    pub requires_proxy: bool,

    /// Brand integration needs a dedicated network appliance (hosted cloud only)
    #[serde(default)]
    pub requires_network_appliance: bool,
}

impl Brand {
    /// Create a brand with only a description
    pub fn named(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Normalized display name: description, falling back to the code, uppercased and trimmed
    pub fn display_name(&self) -> String {
        let raw = if self.description.trim().is_empty() {
            self.code.as_deref().unwrap_or_default()
        } else {
            self.description.as_str()
        };
        raw.trim().to_uppercase()
    }
}

/// A reference to a brand on a company: either the full catalog entry or a bare id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    /// Embedded catalog entry
    Embedded(Brand),
    /// Catalog id (or a literal brand label)
    Id(String),
}

impl From<Brand> for BrandRef {
    fn from(brand: Brand) -> Self {
        BrandRef::Embedded(brand)
    }
}

impl From<&str> for BrandRef {
    fn from(id: &str) -> Self {
        BrandRef::Id(id.to_string())
    }
}

/// A brand after catalog resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBrand {
    /// Uppercased, trimmed display name
    pub name: String,
    pub requires_proxy: bool,
    pub requires_network_appliance: bool,
}

impl ResolvedBrand {
    fn from_brand(brand: &Brand) -> Self {
        Self {
            name: brand.display_name(),
            requires_proxy: brand.requires_proxy,
            requires_network_appliance: brand.requires_network_appliance,
        }
    }

    fn literal(label: &str) -> Self {
        Self {
            name: label.trim().to_uppercase(),
            requires_proxy: false,
            requires_network_appliance: false,
        }
    }
}

/// Brand catalog used to resolve id references
#[derive(Debug, Clone, Default)]
pub struct BrandCatalog {
    brands: Vec<Brand>,
}

impl BrandCatalog {
    pub fn new(brands: Vec<Brand>) -> Self {
        Self { brands }
    }

    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    /// Resolve a reference. Unknown ids become literal uppercase labels.
    pub fn resolve(&self, brand: &BrandRef) -> ResolvedBrand {
        match brand {
            BrandRef::Embedded(b) => ResolvedBrand::from_brand(b),
            BrandRef::Id(id) => match self
                .brands
                .iter()
                .find(|b| b.id.as_deref() == Some(id.as_str()))
            {
                Some(b) => ResolvedBrand::from_brand(b),
                None => ResolvedBrand::literal(id),
            },
        }
    }
}
