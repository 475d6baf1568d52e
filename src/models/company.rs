//! Company data model

use serde::{Deserialize, Deserializer, Serialize};

use super::BrandRef;

/// Category of a company inside the tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyCategory {
    Plate,
    Dealer,
    Workshop,
    PartsReseller,
    Accountant,
}

impl CompanyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyCategory::Plate => "PLATE",
            CompanyCategory::Dealer => "DEALER",
            CompanyCategory::Workshop => "WORKSHOP",
            CompanyCategory::PartsReseller => "PARTS_RESELLER",
            CompanyCategory::Accountant => "ACCOUNTANT",
        }
    }
}

/// A company belonging to the tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Store identifier, absent until the company is saved
    #[serde(default, rename = "_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<CompanyCategory>,

    #[serde(default)]
    pub tax_id: String,

    /// Primary-application seats
    #[serde(default, deserialize_with = "lenient_count")]
    pub licenses: u32,

    /// Web seats
    #[serde(default, deserialize_with = "lenient_count")]
    pub web_licenses: u32,

    #[serde(default)]
    pub brands: Vec<BrandRef>,

    #[serde(default)]
    pub note: String,
}

impl Company {
    /// Create an unsaved company with a name and no brands
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: CompanyCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_licenses(mut self, licenses: u32, web_licenses: u32) -> Self {
        self.licenses = licenses;
        self.web_licenses = web_licenses;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<BrandRef>) -> Self {
        self.brands.push(brand.into());
        self
    }
}

/// Accept license counters as numbers or numeric strings; anything else counts as zero
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Unknown or blank categories decode to `None`
fn lenient_category<'de, D>(deserializer: D) -> Result<Option<CompanyCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
