//! Fault and asset domain entities shared by the store, the search core and the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of monitored asset a fault belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Well,
    Transformer,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Well => "well",
            Self::Transformer => "transformer",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "well" => Ok(Self::Well),
            "transformer" => Ok(Self::Transformer),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown asset kind: {}",
                other
            ))),
        }
    }
}

/// Reference to the asset that owns a fault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub id: String,
}

impl AssetRef {
    pub fn well(id: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Well,
            id: id.into(),
        }
    }

    pub fn transformer(id: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Transformer,
            id: id.into(),
        }
    }
}

/// One observed anomaly on a monitored asset.
///
/// Serialized with the same field names the dashboard reads from the faults table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub fault_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer_id: Option<String>,
    pub part_id: String,
    pub fault_type: String,
    pub status: String,
    /// `None` when the stored timestamp could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_specifications: Option<serde_json::Value>,
}

/// A fault about to be inserted. The store assigns nothing; ids and timestamps come from here.
#[derive(Debug, Clone)]
pub struct NewFault {
    pub fault_id: String,
    pub asset: AssetRef,
    pub part_id: String,
    pub fault_type: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub description: Option<String>,
    pub part_specifications: Option<serde_json::Value>,
}

impl NewFault {
    /// Domain view of the fault once stored.
    pub fn to_record(&self) -> FaultRecord {
        let (well_id, transformer_id) = match self.asset.kind {
            AssetKind::Well => (Some(self.asset.id.clone()), None),
            AssetKind::Transformer => (None, Some(self.asset.id.clone())),
        };
        FaultRecord {
            fault_id: self.fault_id.clone(),
            well_id,
            transformer_id,
            part_id: self.part_id.clone(),
            fault_type: self.fault_type.clone(),
            status: self.status.clone(),
            timestamp: Some(self.timestamp),
            description: self.description.clone(),
            part_specifications: self.part_specifications.clone(),
        }
    }
}

/// A registered well or transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub kind: AssetKind,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_details: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
