use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Export column names ───────────────────────────────────────────────────────

pub const TIME_COLUMN: &str = "Time";
pub const SITE_NAME_COLUMN: &str = "Site Location Name";
pub const SITE_ID_COLUMN: &str = "Site Location ID";
pub const REGION_COLUMN: &str = "Region";
pub const CLUSTER_ID_COLUMN: &str = "Cluster ID";

/// Header of the availability measurement in the network exports.
pub const AVAILABILITY_COLUMN: &str = "Cell Availability (Excl Cell Block)(%)";

// ── Region ────────────────────────────────────────────────────────────────────

/// Operational region a site belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Eastern,
    Southern,
    /// Any region label the report does not track separately.
    Other(String),
}

impl FromStr for Region {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Region::from_label(value))
    }
}

impl Region {
    /// Case-insensitive; unknown labels are kept verbatim (trimmed).
    pub fn from_label(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_uppercase().as_str() {
            "EASTERN" => Region::Eastern,
            "SOUTHERN" => Region::Southern,
            _ => Region::Other(trimmed.to_string()),
        }
    }

    /// Title-case name used in sheet names, chart titles and column headers.
    pub fn display_name(&self) -> &str {
        match self {
            Region::Eastern => "Eastern",
            Region::Southern => "Southern",
            Region::Other(name) => name,
        }
    }
}

impl fmt::Display for Region {
    /// Upper-case export spelling (`EASTERN`, `SOUTHERN`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Eastern => write!(f, "EASTERN"),
            Region::Southern => write!(f, "SOUTHERN"),
            Region::Other(name) => write!(f, "{}", name),
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One availability measurement after projection onto the reporting columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Measurement day.
    pub time: NaiveDate,
    pub site_name: String,
    /// Unique per site.
    pub site_id: String,
    pub region: Region,
    pub cluster_id: String,
    /// Cell availability excluding planned blocking, in percent.
    pub availability: f64,
}

// ── Field selectors ───────────────────────────────────────────────────────────

/// Typed selector for the record fields that can take part in a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Time,
    SiteName,
    SiteId,
    Region,
    ClusterId,
}

impl Field {
    /// The export column this field is read from.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Time => TIME_COLUMN,
            Field::SiteName => SITE_NAME_COLUMN,
            Field::SiteId => SITE_ID_COLUMN,
            Field::Region => REGION_COLUMN,
            Field::ClusterId => CLUSTER_ID_COLUMN,
        }
    }

    /// Pull this field's value out of `record` as a comparable key part.
    pub fn extract(self, record: &Record) -> KeyValue {
        match self {
            Field::Time => KeyValue::Date(record.time),
            Field::SiteName => KeyValue::Text(record.site_name.clone()),
            Field::SiteId => KeyValue::Text(record.site_id.clone()),
            Field::Region => KeyValue::Text(record.region.to_string()),
            Field::ClusterId => KeyValue::Text(record.cluster_id.clone()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One component of a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyValue {
    Date(NaiveDate),
    Text(String),
}

impl KeyValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            KeyValue::Date(date) => Some(*date),
            KeyValue::Text(_) => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            KeyValue::Text(text) => f.write_str(text),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
