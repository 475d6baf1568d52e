//! Server and disk data model

use serde::{Deserialize, Deserializer, Serialize};

/// Drive letter of the system disk
pub const SYSTEM_DRIVE: &str = "C";

/// Proposal status of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Needed to run the workload
    #[default]
    Required,
    /// Suggested headroom
    Recommended,
    /// Status not decided (also used for unknown values)
    #[serde(other)]
    Undefined,
}

impl ServerStatus {
    /// Parse a status hint; unknown values map to `Undefined`, blank values to `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" => None,
            "required" => Some(ServerStatus::Required),
            "recommended" => Some(ServerStatus::Recommended),
            _ => Some(ServerStatus::Undefined),
        }
    }
}

/// A disk attached to a server. Identity is positional within the disk list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Store identifier of the disk entry
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub letter: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub size: String,
}

impl Disk {
    pub fn new(letter: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            id: None,
            letter: letter.into(),
            size: size.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.letter.eq_ignore_ascii_case(SYSTEM_DRIVE)
    }

    /// A disk entry needs both a letter and a size
    pub fn is_valid(&self) -> bool {
        !self.letter.trim().is_empty() && !self.size.trim().is_empty()
    }
}

/// A proposed or persisted server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Store identifier, assigned on persistence
    #[serde(default, rename = "_id")]
    pub id: Option<String>,

    /// Role token (e.g. "DB", "SCALE-2", "CX_PSA_AcmeMotors")
    #[serde(default)]
    pub role: String,

    /// Absent when the stored document carries no usable status
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ServerStatus>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub cpu: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub ram: Option<String>,

    /// Ordered disks; anything other than a list decodes as empty
    #[serde(default, deserialize_with = "lenient_disks")]
    pub disk_list: Vec<Disk>,
}

impl Server {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    /// True when the disk list can be carried forward as-is.
    ///
    /// An empty list is invalid: a stored non-list decodes to empty, and every
    /// server needs a system drive.
    pub fn has_valid_disks(&self) -> bool {
        !self.disk_list.is_empty() && self.disk_list.iter().all(Disk::is_valid)
    }
}

/// Per-role default sizing from the server-defaults catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDefault {
    /// Base role token
    pub role: String,

    #[serde(default, deserialize_with = "lenient_status")]
    pub default_status: Option<ServerStatus>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub default_cpu: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub default_ram: Option<String>,

    #[serde(default, deserialize_with = "lenient_disks")]
    pub default_disk_list: Vec<Disk>,
}

impl ServerDefault {
    /// Size of the first disk in the default layout, if any
    pub fn system_drive_size(&self) -> Option<&str> {
        self.default_disk_list
            .first()
            .map(|d| d.size.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

fn text_of(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// CPU, RAM and sizes arrive as strings or numbers
pub(crate) fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(serde_json::Value::deserialize(deserializer)?))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(serde_json::Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ServerStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(serde_json::Value::deserialize(deserializer)?)
        .as_deref()
        .and_then(ServerStatus::parse))
}

fn lenient_disks<'de, D>(deserializer: D) -> Result<Vec<Disk>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_disks(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_opt_disks<'de, D>(deserializer: D) -> Result<Option<Vec<Disk>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
    ))
}
