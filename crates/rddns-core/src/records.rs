//! DNS record data model
//!
//! These types mirror what a registrar hands back. The synchronizer only
//! ever holds transient, read-only copies fetched during a single run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record type tag for IPv4 address records
pub const RECORD_TYPE_A: &str = "A";

/// Opaque registrar record identifier
///
/// Registrars disagree on whether IDs are numbers or strings, so both are
/// accepted. The `Display` form is the raw value, suitable for URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric ID (e.g. DigitalOcean)
    Numeric(u64),
    /// String ID
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Numeric(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Numeric(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// A DNS record as published by the registrar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Registrar record ID
    pub id: RecordId,

    /// Record type (e.g. "A")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record name, compared verbatim against configured hostnames
    pub name: String,

    /// Record value; an IPv4 address for A records
    #[serde(default)]
    pub data: String,

    /// Time-to-live, when the registrar reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Priority (MX/SRV), when the registrar reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl DomainRecord {
    /// Create a record without the optional registrar extras
    pub fn new(
        id: impl Into<RecordId>,
        record_type: impl Into<String>,
        name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            name: name.into(),
            data: data.into(),
            ttl: None,
            priority: None,
        }
    }
}

/// A target record whose published data differs from the current address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedRecord {
    pub id: RecordId,
    pub record_type: String,
    pub name: String,
    /// The stale value currently published
    pub data: String,
}

impl MismatchedRecord {
    /// Build the update body that points this record at `address`
    ///
    /// Type and name are carried over unchanged.
    pub fn corrected(&self, address: &str) -> RecordUpdate {
        RecordUpdate {
            record_type: self.record_type.clone(),
            name: self.name.clone(),
            data: address.to_string(),
        }
    }
}

impl From<&DomainRecord> for MismatchedRecord {
    fn from(record: &DomainRecord) -> Self {
        Self {
            id: record.id.clone(),
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            data: record.data.clone(),
        }
    }
}

/// Body of a record update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
}
