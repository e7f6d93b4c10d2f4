//! Web search for anomaly context.
//!
//! Two providers implement [`SearchProvider`]: [`BingProvider`] calls the Bing
//! Web Search API, [`StaticProvider`] returns a fixed result set and is used
//! whenever no API key is configured.

pub mod bing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anomaly::AnomalyType;
use crate::config::SearchConfig;

pub use self::bing::BingProvider;

/// Result count used for anomaly context lookups.
pub const CONTEXT_RESULT_COUNT: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse search response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
    pub source: String,
}

/// Trait for all web search backends.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human-readable backend name, reported as `source` in responses.
    fn name(&self) -> &'static str;

    /// Run a query, returning at most `count` results.
    async fn search(&self, query: &str, count: usize) -> Result<SearchResponse, SearchError>;
}

/// Pick the backend for the given configuration.
pub fn provider_from_config(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>, SearchError> {
    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            tracing::info!(endpoint = %config.endpoint, "using Bing search provider");
            Ok(Arc::new(BingProvider::new(key, &config.endpoint)?))
        }
        _ => {
            tracing::info!("no search API key configured, using static results");
            Ok(Arc::new(StaticProvider))
        }
    }
}

/// Search for background on how a category of anomaly is usually resolved.
pub async fn anomaly_context(
    provider: &dyn SearchProvider,
    kind: AnomalyType,
) -> Result<SearchResponse, SearchError> {
    let query = format!("MANUS Blockchain {} anomaly resolution", kind);
    provider.search(&query, CONTEXT_RESULT_COUNT).await
}

// ---------------------------------------------------------------------------
// StaticProvider
// ---------------------------------------------------------------------------

const STATIC_RESULTS: [(&str, &str, &str); 5] = [
    (
        "Manus Blockchain - Interplanetary Distributed Ledger",
        "https://manus.blockchain/docs",
        "Manus Blockchain enables immutable logging across Earth, Moon, and Mars nodes with advanced anomaly detection.",
    ),
    (
        "GitHub Copilot Integration Best Practices",
        "https://github.com/features/copilot",
        "AI-powered code completion and anomaly detection for modern development workflows.",
    ),
    (
        "Coopetition Framework in Distributed AI Systems",
        "https://research.ai/coopetition",
        "Balancing collaboration and competition among autonomous agents in decentralized environments.",
    ),
    (
        "Superintelligence Loop Architecture",
        "https://ai.research/superintelligence-loops",
        "Iterative analysis patterns combining search insights with AI-driven decision making.",
    ),
    (
        "DAO Governance and Vote Propagation",
        "https://dao.governance/voting-systems",
        "Decentralized autonomous organization voting mechanisms across distributed networks.",
    ),
];

/// Offline provider returning a fixed result set.
pub struct StaticProvider;

#[async_trait::async_trait]
impl SearchProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "Mock Search (API key not configured)"
    }

    async fn search(&self, query: &str, count: usize) -> Result<SearchResponse, SearchError> {
        // A count of zero means "no limit" here, matching the live API default.
        let limit = if count > 0 && count < STATIC_RESULTS.len() {
            count
        } else {
            STATIC_RESULTS.len()
        };

        let results: Vec<SearchResult> = STATIC_RESULTS[..limit]
            .iter()
            .map(|(title, url, snippet)| SearchResult {
                title: title.to_string(),
                url: url.to_string(),
                description: None,
                snippet: Some(snippet.to_string()),
            })
            .collect();

        Ok(SearchResponse {
            query: query.to_string(),
            total_results: results.len(),
            results,
            source: self.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_returns_all_by_default() {
        let resp = StaticProvider.search("manus", 10).await.unwrap();
        assert_eq!(resp.query, "manus");
        assert_eq!(resp.total_results, 5);
        assert_eq!(resp.results.len(), 5);
        assert_eq!(resp.source, "Mock Search (API key not configured)");
    }

    #[tokio::test]
    async fn test_static_truncates_to_count() {
        let resp = StaticProvider.search("manus", 2).await.unwrap();
        assert_eq!(resp.total_results, 2);
        assert_eq!(resp.results[0].url, "https://manus.blockchain/docs");
        assert!(resp.results[1].snippet.is_some());
    }

    #[tokio::test]
    async fn test_static_zero_count_is_unlimited() {
        let resp = StaticProvider.search("manus", 0).await.unwrap();
        assert_eq!(resp.total_results, 5);
    }

    #[tokio::test]
    async fn test_anomaly_context_query() {
        let resp = anomaly_context(&StaticProvider, AnomalyType::DaoVoteFailure)
            .await
            .unwrap();
        assert_eq!(resp.query, "MANUS Blockchain dao_vote_failure anomaly resolution");
        assert_eq!(resp.total_results, CONTEXT_RESULT_COUNT);
    }

    #[test]
    fn test_provider_selection() {
        let mut config = SearchConfig::default();
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "Mock Search (API key not configured)");

        config.api_key = Some("secret".into());
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "Bing Search API");

        config.endpoint = "not a url".into();
        assert!(matches!(
            provider_from_config(&config),
            Err(SearchError::InvalidEndpoint { .. })
        ));
    }
}
