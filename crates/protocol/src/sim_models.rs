//! Simulated common-data-model (CDM) track feed.
//!
//! Events mimic what the Link-16 and VMF adapters would emit after mapping
//! into the common data model, including the fields each source tends to
//! leave out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Message standard an event was mapped from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Link16,
    Vmf,
}

impl SourceType {
    pub const ALL: [SourceType; 2] = [SourceType::Link16, SourceType::Vmf];

    /// Parse a `sources` query entry, ignoring case and surrounding blanks.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "link16" => Some(Self::Link16),
            "vmf" => Some(Self::Vmf),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub enum CdmEntity {
    Track,
    Unit,
}

/// A field that did not map cleanly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Deviation {
    pub field: String,
    pub issue: String,
}

impl Deviation {
    pub fn new(field: &str, issue: &str) -> Self {
        Self {
            field: field.to_string(),
            issue: issue.to_string(),
        }
    }
}

/// Position report in the common data model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct CdmRecord {
    pub entity: CdmEntity,
    pub unit_id: String,
    pub lat: f64,
    pub lon: f64,

    /// Knots. Absent when the source message omitted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | undefined")]
    pub speed: Option<i64>,

    /// Degrees in `0..360`. Absent when the source message omitted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | undefined")]
    pub heading: Option<i64>,
}

/// One item of the feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct CdmEvent {
    pub id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub ts: DateTime<Utc>,

    pub source: SourceType,
    pub cdm: CdmRecord,
    pub deviations: Vec<Deviation>,
}

/// Query string of the feed endpoint.
///
/// `sources` is a comma-separated list; `intervalMs` is kept raw so that
/// out-of-range or malformed values can be clamped instead of rejected.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CdmFeedQuery {
    #[serde(default)]
    pub sources: Option<String>,

    #[serde(default)]
    pub interval_ms: Option<String>,
}
