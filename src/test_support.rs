//! In-process fakes shared by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::agent::stateless_llm::{EmbeddingInterface, Message, StatelessLLMInterface};
use crate::tools::{Tool, ToolError, ToolResult};

/// A recorded `chat_completion` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub stop: Vec<String>,
}

/// LLM that replays canned responses in order and records its inputs.
#[derive(Default)]
pub struct ScriptedLLM {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Option<Duration>,
}

impl ScriptedLLM {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
            latency: None,
        })
    }

    /// Like `new`, but every call sleeps for `latency` before answering.
    pub fn with_latency<I, S>(responses: I, latency: Duration) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
            latency: Some(latency),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatelessLLMInterface for ScriptedLLM {
    async fn chat_completion(
        &self,
        messages: Vec<Message>,
        system: Option<&str>,
        stop: &[&str],
    ) -> Result<String, anyhow::Error> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            system: system.map(str::to_string),
            stop: stop.iter().map(|s| s.to_string()).collect(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted LLM has no responses left"))
    }
}

/// Embeds text as per-keyword occurrence counts.
pub struct KeywordEmbeddings {
    keywords: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordEmbeddings {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingInterface for KeywordEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                self.keywords
                    .iter()
                    .map(|k| text.split_whitespace().filter(|w| *w == k.as_str()).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Tool returning a fixed answer (or a fixed failure) and recording inputs.
pub struct StaticTool {
    name: String,
    output: Result<String, String>,
    inputs: Mutex<Vec<String>>,
}

impl StaticTool {
    pub fn ok(name: &str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            output: Ok(output.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            output: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    async fn run(&self, input: &str) -> ToolResult {
        self.inputs.lock().unwrap().push(input.to_string());
        self.output
            .clone()
            .map_err(ToolError::Unexpected)
    }
}
