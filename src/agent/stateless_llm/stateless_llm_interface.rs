use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single chat message in OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Interface for a stateless language model
/// Stateless means the LLM doesn't store memory, system prompts, or user messages
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Generate a chat completion and return the full response text.
    ///
    /// # Arguments
    /// * `messages` - Conversation messages, oldest first
    /// * `system` - Optional system prompt, sent before `messages`
    /// * `stop` - Sequences at which the model stops generating
    async fn chat_completion(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
        stop: &[&str],
    ) -> Result<String, anyhow::Error>;
}

/// Interface for a text embedding model
#[async_trait]
pub trait EmbeddingInterface: Send + Sync {
    /// Embed a batch of documents, returning one vector per input in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding model returned no vector for the query"))
    }
}
