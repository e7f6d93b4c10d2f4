//! In-memory anomaly registry.
//!
//! The registry is the only shared mutable state in the service. Readers
//! (`get`, `list_all`, `report`) share a `tokio::sync::RwLock`; writers
//! (`detect`, `resolve`) take it exclusively for a single in-memory update.
//! Nothing is persisted: the store starts empty on every process start.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::scan::simulated_batch;
use super::{Anomaly, AnomalyError, AnomalyFilter, AnomalyReport};

/// Owns every anomaly record known to the service, keyed by ID.
#[derive(Default)]
pub struct AnomalyRegistry {
    anomalies: RwLock<HashMap<String, Anomaly>>,
}

impl AnomalyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a simulated scan and store every anomaly it produces.
    ///
    /// Each call inserts a new batch with fresh IDs; earlier detections are
    /// never merged or replaced. Returns the batch in generation order.
    pub async fn detect(&self) -> Vec<Anomaly> {
        let batch = simulated_batch(Utc::now());

        let mut anomalies = self.anomalies.write().await;
        for anomaly in &batch {
            anomalies.insert(anomaly.id.clone(), anomaly.clone());
        }

        info!(
            detected = batch.len(),
            total = anomalies.len(),
            "anomaly scan complete"
        );
        batch
    }

    /// Look up a single anomaly by ID.
    pub async fn get(&self, id: &str) -> Result<Anomaly, AnomalyError> {
        let anomalies = self.anomalies.read().await;
        match anomalies.get(id) {
            Some(anomaly) => Ok(anomaly.clone()),
            None => {
                debug!(anomaly_id = id, "anomaly lookup missed");
                Err(AnomalyError::NotFound(id.to_string()))
            }
        }
    }

    /// Snapshot of every stored anomaly. Order is unspecified.
    pub async fn list_all(&self) -> Vec<Anomaly> {
        self.anomalies.read().await.values().cloned().collect()
    }

    /// Snapshot of the anomalies matching every criterion set in `filter`.
    /// Order is unspecified.
    pub async fn filter(&self, filter: &AnomalyFilter) -> Vec<Anomaly> {
        self.anomalies
            .read()
            .await
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// Mark an anomaly as resolved with the given explanation.
    ///
    /// Resolving an already-resolved anomaly overwrites its resolution text
    /// and timestamp. Returns the updated record.
    pub async fn resolve(&self, id: &str, resolution: &str) -> Result<Anomaly, AnomalyError> {
        let mut anomalies = self.anomalies.write().await;
        let Some(anomaly) = anomalies.get_mut(id) else {
            warn!(anomaly_id = id, "attempted to resolve unknown anomaly");
            return Err(AnomalyError::NotFound(id.to_string()));
        };

        let now = Utc::now().max(anomaly.detected_at);
        anomaly.mark_resolved(resolution, now);
        info!(
            anomaly_id = id,
            kind = %anomaly.kind,
            "anomaly resolved"
        );
        Ok(anomaly.clone())
    }

    /// Compute a fresh aggregate report from the current store.
    pub async fn report(&self) -> AnomalyReport {
        let anomalies = self.anomalies.read().await;
        AnomalyReport::tally(anomalies.values(), Utc::now())
    }

    pub async fn len(&self) -> usize {
        self.anomalies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.anomalies.read().await.is_empty()
    }
}
