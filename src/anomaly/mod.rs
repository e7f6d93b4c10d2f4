//! Anomaly records, the in-memory registry, and report generation.

pub mod registry;
pub mod report;
pub mod scan;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::registry::AnomalyRegistry;
pub use self::report::AnomalyReport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnomalyError {
    #[error("anomaly not found: {0}")]
    NotFound(String),
}

/// Category of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    LedgerDivergence,
    DaoVoteFailure,
    CommitAnomaly,
    #[serde(rename = "node_desync")]
    NodeDesynchronization,
    Unknown,
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyType::LedgerDivergence => f.pad("ledger_divergence"),
            AnomalyType::DaoVoteFailure => f.pad("dao_vote_failure"),
            AnomalyType::CommitAnomaly => f.pad("commit_anomaly"),
            AnomalyType::NodeDesynchronization => f.pad("node_desync"),
            AnomalyType::Unknown => f.pad("unknown"),
        }
    }
}

/// Severity levels for detected anomalies, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => f.pad("critical"),
            Severity::High => f.pad("high"),
            Severity::Medium => f.pad("medium"),
            Severity::Low => f.pad("low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Detected,
    Analyzing,
    Resolved,
    Ignored,
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyStatus::Detected => f.pad("detected"),
            AnomalyStatus::Analyzing => f.pad("analyzing"),
            AnomalyStatus::Resolved => f.pad("resolved"),
            AnomalyStatus::Ignored => f.pad("ignored"),
        }
    }
}

/// A single diagnostic value attached to an anomaly.
///
/// Serialized untagged so the JSON form is the plain scalar or array, while
/// deserialization recovers the variant from the JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<MetadataValue>),
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(v: Vec<T>) -> Self {
        MetadataValue::List(v.into_iter().map(Into::into).collect())
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// A detected anomaly with classification, status, and optional resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnomalyType,
    pub description: String,
    pub severity: Severity,
    pub status: AnomalyStatus,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Optional criteria for narrowing a listing. Every criterion that is set
/// must match; an empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AnomalyFilter {
    #[serde(default, rename = "type")]
    pub kind: Option<AnomalyType>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub status: Option<AnomalyStatus>,
}

impl AnomalyFilter {
    pub fn matches(&self, anomaly: &Anomaly) -> bool {
        self.kind.map_or(true, |k| anomaly.kind == k)
            && self.severity.map_or(true, |s| anomaly.severity == s)
            && self.status.map_or(true, |s| anomaly.status == s)
    }
}

impl Anomaly {
    pub fn is_resolved(&self) -> bool {
        self.status == AnomalyStatus::Resolved
    }

    /// Transition to `Resolved`, stamping the resolution time and text.
    /// Calling this on an already-resolved record overwrites both.
    pub(crate) fn mark_resolved(&mut self, resolution: &str, at: DateTime<Utc>) {
        self.status = AnomalyStatus::Resolved;
        self.resolved_at = Some(at);
        self.resolution = Some(resolution.to_string());
    }
}
