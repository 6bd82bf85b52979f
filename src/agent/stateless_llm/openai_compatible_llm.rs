use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::stateless_llm_interface::{Message, StatelessLLMInterface};

/// OpenAI compatible LLM implementation
/// Talks to any `/chat/completions` endpoint speaking the OpenAI wire format
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl OpenAICompatibleLLM {
    pub fn new(
        client: Client,
        model: String,
        base_url: String,
        api_key: String,
        temperature: f32,
    ) -> Self {
        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature,
        }
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
        stop: &[&str],
    ) -> Result<String, anyhow::Error> {
        let mut request_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            request_messages.push(Message::system(sys));
        }
        request_messages.extend(messages);

        let mut body = json!({
            "model": self.model,
            "messages": request_messages,
            "temperature": self.temperature,
        });
        if !stop.is_empty() {
            body["stop"] = json!(stop);
        }

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting chat completion from {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM request failed with status {}: {}", status, text);
        }

        let result: Value = response.json().await?;
        let content = result
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("LLM response has no message content: {}", result))?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm(server: &MockServer) -> OpenAICompatibleLLM {
        OpenAICompatibleLLM::new(
            Client::new(),
            "gpt-4o".to_string(),
            format!("{}/", server.uri()),
            "test-key".to_string(),
            0.0,
        )
    }

    #[tokio::test]
    async fn sends_system_prompt_and_stop_sequences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ],
                "stop": ["\nObservation:"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = llm(&server)
            .chat_completion(vec![Message::user("hello")], Some("be brief"), &["\nObservation:"])
            .await
            .unwrap();
        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = llm(&server)
            .chat_completion(vec![Message::user("hello")], None, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("slow down"));
    }
}
