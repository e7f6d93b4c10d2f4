use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Anomaly, AnomalyType, Severity};

/// Point-in-time tally over every anomaly in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    #[serde(rename = "total_anomalies")]
    pub total: usize,
    #[serde(rename = "resolved_anomalies")]
    pub resolved_count: usize,
    #[serde(rename = "pending_anomalies")]
    pub pending_count: usize,
    /// Only severities with at least one anomaly appear.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Only types with at least one anomaly appear.
    pub by_type: BTreeMap<AnomalyType, usize>,
    /// Percentage of anomalies resolved, rounded to one decimal place.
    /// Zero for an empty registry.
    pub resolution_rate: f64,
    pub generated_at: DateTime<Utc>,
}

impl AnomalyReport {
    pub fn tally<'a, I>(anomalies: I, generated_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Anomaly>,
    {
        let mut report = Self {
            total: 0,
            resolved_count: 0,
            pending_count: 0,
            by_severity: BTreeMap::new(),
            by_type: BTreeMap::new(),
            resolution_rate: 0.0,
            generated_at,
        };

        for anomaly in anomalies {
            report.total += 1;
            if anomaly.is_resolved() {
                report.resolved_count += 1;
            } else {
                report.pending_count += 1;
            }
            *report.by_severity.entry(anomaly.severity).or_default() += 1;
            *report.by_type.entry(anomaly.kind).or_default() += 1;
        }

        if report.total > 0 {
            let rate = report.resolved_count as f64 * 100.0 / report.total as f64;
            report.resolution_rate = (rate * 10.0).round() / 10.0;
        }
        report
    }
}
