//! Manus ledger client.
//!
//! The ledger has no real RPC backend yet. Status snapshots are fixed values
//! and anomaly logging only formats a transaction hash locally.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const STUB_CURRENT_BLOCK: u64 = 1_234_567;

/// Snapshot of the ledger network as reported by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub network_id: String,
    pub current_block: u64,
    pub planetary_nodes: Vec<String>,
    pub sync_status: String,
    pub last_block_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LedgerClient {
    node_url: String,
    network_id: String,
    enable_planetary: bool,
}

impl LedgerClient {
    pub fn new(node_url: impl Into<String>, network_id: impl Into<String>, enable_planetary: bool) -> Self {
        Self {
            node_url: node_url.into(),
            network_id: network_id.into(),
            enable_planetary,
        }
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    pub fn status(&self) -> LedgerStatus {
        let mut nodes = vec!["Earth-Node-1".to_string()];
        if self.enable_planetary {
            nodes.push("Moon-Node-1".to_string());
            nodes.push("Mars-Node-1".to_string());
        }

        LedgerStatus {
            network_id: self.network_id.clone(),
            current_block: STUB_CURRENT_BLOCK,
            planetary_nodes: nodes,
            sync_status: "synchronized".to_string(),
            last_block_time: Utc::now() - Duration::seconds(15),
        }
    }

    /// Record an anomaly on the ledger and return the transaction hash.
    ///
    /// Hash format: `0x` + the first 8 characters of the anomaly ID + the
    /// current Unix timestamp.
    pub fn log_anomaly(&self, anomaly_id: &str, description: &str) -> String {
        let prefix: String = anomaly_id.chars().take(8).collect();
        let tx_hash = format!("0x{}{}", prefix, Utc::now().timestamp());
        info!(
            anomaly_id,
            tx_hash = %tx_hash,
            node = %self.node_url,
            description_len = description.len(),
            "anomaly logged to ledger"
        );
        tx_hash
    }

    /// Check a Git commit hash against the ledger.
    ///
    /// Without a backing node nothing can be looked up, so this only checks
    /// shape: any abbreviated or full SHA-1 (7 to 40 hex digits) is reported
    /// as verified. Earlier stub versions answered `true` for every input;
    /// malformed hashes are now rejected instead.
    pub fn verify_commit(&self, commit_hash: &str) -> bool {
        let verified = (7..=40).contains(&commit_hash.len())
            && commit_hash.chars().all(|c| c.is_ascii_hexdigit());
        debug!(commit_hash, verified, "commit verification");
        verified
    }
}
