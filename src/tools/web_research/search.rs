use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// A single search result entry. Only the URL is used; the page itself is
/// loaded separately.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily web search client.
pub struct WebSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl WebSearchClient {
    pub fn new(client: Client, base_url: String, api_key: String, max_results: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.base_url);
        debug!(query = %query, max_results = self.max_results, "Running web search");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": query,
                "max_results": self.max_results,
                "search_depth": "advanced",
            }))
            .send()
            .await?
            .error_for_status()?;

        let mut body: SearchResponse = response.json().await?;
        body.results.truncate(self.max_results);
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn results_are_capped() {
        let server = MockServer::start().await;
        let results: Vec<_> = (0..6)
            .map(|i| json!({"url": format!("https://example.com/{}", i), "title": "t"}))
            .collect();
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-key"))
            .and(body_partial_json(json!({"query": "best time to visit Kyoto", "max_results": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
            .mount(&server)
            .await;

        let client = WebSearchClient::new(Client::new(), server.uri(), "tvly-key".into(), 4);
        let hits = client.search("best time to visit Kyoto").await.unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].url, "https://example.com/0");
    }
}
