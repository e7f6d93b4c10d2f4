use std::sync::Arc;

use crate::anomaly::AnomalyRegistry;
use crate::blockchain::LedgerClient;
use crate::search::SearchProvider;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AnomalyRegistry>,
    pub search: Arc<dyn SearchProvider>,
    pub ledger: Arc<LedgerClient>,
}

impl AppState {
    pub fn new(
        registry: Arc<AnomalyRegistry>,
        search: Arc<dyn SearchProvider>,
        ledger: Arc<LedgerClient>,
    ) -> Self {
        Self {
            registry,
            search,
            ledger,
        }
    }
}
