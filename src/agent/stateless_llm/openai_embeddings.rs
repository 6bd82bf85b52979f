use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::stateless_llm_interface::EmbeddingInterface;

/// Inputs sent per `/embeddings` request.
const EMBEDDING_BATCH_SIZE: usize = 512;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings from an OpenAI compatible `/embeddings` endpoint
pub struct OpenAIEmbeddings {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl OpenAIEmbeddings {
    pub fn new(client: Client, model: String, base_url: String, api_key: String) -> Self {
        Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": batch }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding request failed with status {}: {}", status, text);
        }

        let mut result: EmbeddingResponse = response.json().await?;
        if result.data.len() != batch.len() {
            anyhow::bail!(
                "Embedding model returned {} vectors for {} inputs",
                result.data.len(),
                batch.len()
            );
        }
        result.data.sort_by_key(|d| d.index);
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingInterface for OpenAIEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            debug!("Embedding batch of {} texts", batch.len());
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn vectors_are_returned_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let embeddings = OpenAIEmbeddings::new(
            Client::new(),
            "text-embedding-ada-002".to_string(),
            server.uri(),
            "key".to_string(),
        );
        let vectors = embeddings
            .embed_documents(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let embeddings =
            OpenAIEmbeddings::new(Client::new(), "m".to_string(), server.uri(), "key".to_string());
        assert!(embeddings.embed_documents(&[]).await.unwrap().is_empty());
    }
}
