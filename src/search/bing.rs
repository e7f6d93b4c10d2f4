use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SearchError, SearchProvider, SearchResponse, SearchResult};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages", default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Default, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Bing Web Search API v7 provider.
pub struct BingProvider {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl BingProvider {
    pub fn new(api_key: &str, endpoint: &str) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(client, api_key, endpoint)
    }

    /// Use a preconfigured HTTP client (proxy settings, custom timeouts).
    pub fn with_client(client: Client, api_key: &str, endpoint: &str) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SearchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint,
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for BingProvider {
    fn name(&self) -> &'static str {
        "Bing Search API"
    }

    async fn search(&self, query: &str, count: usize) -> Result<SearchResponse, SearchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string());

        debug!(%url, "querying Bing");
        let resp = self
            .client
            .get(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Bing search failed");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: BingResponse = serde_json::from_str(&body)?;
        let results: Vec<SearchResult> = parsed
            .web_pages
            .unwrap_or_default()
            .value
            .into_iter()
            .map(|page| SearchResult {
                title: page.name,
                url: page.url,
                description: None,
                snippet: page.snippet,
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
