//! Simulated anomaly scan.
//!
//! There is no real monitoring source behind the service: a scan produces a
//! fixed set of four anomalies, one per concrete category, with fresh IDs.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{Anomaly, AnomalyStatus, AnomalyType, Metadata, MetadataValue, Severity};

/// Build one detection batch relative to `now`.
pub fn simulated_batch(now: DateTime<Utc>) -> Vec<Anomaly> {
    vec![
        record(
            AnomalyType::LedgerDivergence,
            "Ledger hashes diverge across planetary nodes (Earth, Moon, Mars)",
            Severity::Critical,
            AnomalyStatus::Detected,
            now,
            "Manus Blockchain Monitor",
            [
                (
                    "nodes_affected",
                    vec!["earth-node-1", "moon-node-2", "mars-node-1"].into(),
                ),
                ("hash_mismatch", true.into()),
            ],
        ),
        record(
            AnomalyType::DaoVoteFailure,
            "DAO votes fail to propagate across interplanetary network",
            Severity::High,
            AnomalyStatus::Detected,
            now,
            "DAO Governance System",
            [
                ("proposal_id", "PROP-2026-001".into()),
                ("failed_nodes", 2_i64.into()),
                ("total_nodes", 5_i64.into()),
            ],
        ),
        record(
            AnomalyType::CommitAnomaly,
            "GitHub Copilot detects anomalous commit patterns",
            Severity::Medium,
            AnomalyStatus::Ignored,
            now - Duration::hours(2),
            "GitHub Copilot Integration",
            [
                (
                    "commit_hash",
                    "a3f5b2c1d4e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0".into(),
                ),
                (
                    "repository",
                    "Manus-Copilot-Github-Anomalis-Coopetition-Integration".into(),
                ),
                ("auto_resolved", true.into()),
            ],
        ),
        record(
            AnomalyType::NodeDesynchronization,
            "Interplanetary node synchronization delay detected",
            Severity::Low,
            AnomalyStatus::Analyzing,
            now - Duration::minutes(30),
            "xAI Emissary",
            [
                ("latency_ms", 450_i64.into()),
                ("threshold_ms", 300_i64.into()),
                ("affected_route", "Earth-Mars".into()),
            ],
        ),
    ]
}

fn record<const N: usize>(
    kind: AnomalyType,
    description: &str,
    severity: Severity,
    status: AnomalyStatus,
    detected_at: DateTime<Utc>,
    source: &str,
    metadata: [(&str, MetadataValue); N],
) -> Anomaly {
    Anomaly {
        id: Uuid::new_v4().to_string(),
        kind,
        description: description.to_string(),
        severity,
        status,
        detected_at,
        resolved_at: None,
        metadata: metadata
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Metadata>(),
        source: source.to_string(),
        resolution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_batch_shape() {
        let now = Utc::now();
        let batch = simulated_batch(now);
        assert_eq!(batch.len(), 4);

        let kinds: HashSet<_> = batch.iter().map(|a| a.kind).collect();
        assert_eq!(kinds.len(), 4);
        assert!(!kinds.contains(&AnomalyType::Unknown));

        let severities: HashSet<_> = batch.iter().map(|a| a.severity).collect();
        assert_eq!(severities.len(), 4);

        for a in &batch {
            assert!(!a.id.is_empty());
            assert!(!a.description.is_empty());
            assert!(!a.source.is_empty());
            assert!(!a.metadata.is_empty());
            assert!(a.detected_at <= now);
            assert!(!a.is_resolved());
            assert!(a.resolved_at.is_none());
            assert!(a.resolution.is_none());
        }
    }

    #[test]
    fn test_commit_anomaly_metadata_keys() {
        let batch = simulated_batch(Utc::now());
        let commit = batch
            .iter()
            .find(|a| a.kind == AnomalyType::CommitAnomaly)
            .unwrap();
        assert_eq!(commit.metadata["auto_resolved"], MetadataValue::Bool(true));
        assert!(!commit.metadata.contains_key("auto_verified"));
        assert!(commit.metadata.contains_key("commit_hash"));
        assert!(commit.metadata.contains_key("repository"));
    }

    #[test]
    fn test_batches_get_fresh_ids() {
        let now = Utc::now();
        let first = simulated_batch(now);
        let second = simulated_batch(now);
        let ids: HashSet<_> = first.iter().chain(second.iter()).map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), 8);
    }
}
