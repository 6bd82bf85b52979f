pub mod loader;
pub mod search;
pub mod splitter;
pub mod vector_store;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::agent::stateless_llm::{EmbeddingInterface, Message, StatelessLLMInterface};
use crate::tools::{Tool, ToolError, ToolResult};

pub use loader::WebPageLoader;
pub use search::WebSearchClient;
pub use splitter::RecursiveCharacterTextSplitter;
pub use vector_store::InMemoryVectorStore;

pub const TOOL_NAME: &str = "real_time_web_research";

const DESCRIPTION: &str = "Use this for subjective or knowledge-based questions that need \
    up-to-date information from the web. The input is the question or topic to research.";

const RESEARCH_FAILED: &str = "An error occurred during web research.";

const QA_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. Use the \
    following pieces of retrieved context to answer the question. If the context does not \
    contain enough information, answer from your general knowledge and say explicitly that the \
    answer is not based on the retrieved sources. Use three sentences maximum and keep the \
    answer concise.\n\n{context}";

/// Search, load, split, embed, retrieve, answer.
pub struct WebResearchTool {
    search: WebSearchClient,
    loader: WebPageLoader,
    splitter: RecursiveCharacterTextSplitter,
    embeddings: Arc<dyn EmbeddingInterface>,
    llm: Arc<dyn StatelessLLMInterface>,
    top_k: usize,
}

impl WebResearchTool {
    pub fn new(
        search: WebSearchClient,
        loader: WebPageLoader,
        splitter: RecursiveCharacterTextSplitter,
        embeddings: Arc<dyn EmbeddingInterface>,
        llm: Arc<dyn StatelessLLMInterface>,
        top_k: usize,
    ) -> Self {
        Self {
            search,
            loader,
            splitter,
            embeddings,
            llm,
            top_k,
        }
    }

    async fn research(&self, query: &str) -> anyhow::Result<String> {
        debug!("Performing RAG for query: {}", query);

        let urls: Vec<String> = self
            .search
            .search(query)
            .await?
            .into_iter()
            .map(|hit| hit.url)
            .collect();
        let docs = self.loader.load(&urls).await;
        let splits = self.splitter.split_documents(&docs);
        debug!(
            "Loaded {} of {} pages into {} chunks",
            docs.len(),
            urls.len(),
            splits.len()
        );

        let store = InMemoryVectorStore::from_documents(splits, self.embeddings.as_ref()).await?;
        let context = if store.is_empty() {
            String::new()
        } else {
            let query_vector = self.embeddings.embed_query(query).await?;
            store
                .similarity_search_by_vector(&query_vector, self.top_k)
                .iter()
                .map(|doc| doc.page_content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let system = QA_SYSTEM_PROMPT.replace("{context}", &context);
        let answer = self
            .llm
            .chat_completion(vec![Message::user(query)], Some(&system), &[])
            .await?;
        Ok(answer.trim().to_string())
    }
}

/// Accept either plain text or a JSON object with a `query` key.
fn research_query(input: &str) -> String {
    let trimmed = input.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        if let Some(Value::String(query)) = map.get("query") {
            return query.trim().to_string();
        }
    }
    trimmed.trim_matches('"').trim().to_string()
}

#[async_trait]
impl Tool for WebResearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn run(&self, input: &str) -> ToolResult {
        let query = research_query(input);
        let result = if query.is_empty() {
            Err(ToolError::InvalidInput("The research query is empty.".to_string()))
        } else {
            self.research(&query).await.map_err(ToolError::from)
        };
        if let Err(e) = &result {
            error!("Error during RAG: {}", e);
        }
        result
    }

    fn describe_error(&self, _err: &ToolError) -> String {
        RESEARCH_FAILED.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{KeywordEmbeddings, ScriptedLLM};
    use crate::tools::observe;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(
        server: &MockServer,
        llm: Arc<ScriptedLLM>,
        embeddings: Arc<KeywordEmbeddings>,
    ) -> WebResearchTool {
        WebResearchTool::new(
            WebSearchClient::new(Client::new(), server.uri(), "tvly".to_string(), 4),
            WebPageLoader::new(Client::new()),
            RecursiveCharacterTextSplitter::new(1000, 200).unwrap(),
            embeddings,
            llm,
            4,
        )
    }

    #[tokio::test]
    async fn zero_search_results_still_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let llm = ScriptedLLM::new(["From general knowledge (no sources found): spring is best."]);
        let embeddings = Arc::new(KeywordEmbeddings::new(&["kyoto"]));
        let research = tool(&server, llm.clone(), embeddings.clone());

        let answer = research.run("best season for Kyoto").await.unwrap();
        assert!(answer.contains("spring"));
        assert_eq!(embeddings.calls(), 0);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.as_deref().unwrap().ends_with("concise.\n\n"));
    }

    #[tokio::test]
    async fn retrieved_pages_become_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"url": format!("{}/page/food", server.uri())},
                    {"url": format!("{}/page/gone", server.uri())}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page/food"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>try the ramen in Pontocho alley</p>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let llm = ScriptedLLM::new(["Try the ramen in Pontocho."]);
        let embeddings = Arc::new(KeywordEmbeddings::new(&["ramen"]));
        let research = tool(&server, llm.clone(), embeddings);

        let answer = research
            .run(r#"{"query": "where to eat ramen in Kyoto"}"#)
            .await
            .unwrap();
        assert_eq!(answer, "Try the ramen in Pontocho.");

        let calls = llm.calls();
        let call = &calls[0];
        assert!(call
            .system
            .as_deref()
            .unwrap()
            .contains("try the ramen in Pontocho alley"));
        assert_eq!(call.messages, vec![Message::user("where to eat ramen in Kyoto")]);
    }

    #[tokio::test]
    async fn failures_collapse_to_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let llm = ScriptedLLM::new(Vec::<String>::new());
        let research = tool(&server, llm, Arc::new(KeywordEmbeddings::new(&[])));
        assert_eq!(observe(&research, "anything").await, RESEARCH_FAILED);
    }

    #[tokio::test]
    async fn every_error_kind_renders_the_generic_message() {
        let server = MockServer::start().await;
        let research = tool(
            &server,
            ScriptedLLM::new(Vec::<String>::new()),
            Arc::new(KeywordEmbeddings::new(&[])),
        );

        assert!(matches!(
            research.run("  \"\"  ").await,
            Err(ToolError::InvalidInput(_))
        ));
        for err in [
            ToolError::InvalidInput("empty".to_string()),
            ToolError::NotFound("nothing".to_string()),
            ToolError::Unexpected("boom".to_string()),
        ] {
            assert_eq!(research.describe_error(&err), RESEARCH_FAILED);
        }
        assert_eq!(observe(&research, "\"\"").await, RESEARCH_FAILED);
    }

    #[test]
    fn query_is_unwrapped_from_json() {
        assert_eq!(research_query(r#" {"query": "Lisbon trams"} "#), "Lisbon trams");
        assert_eq!(research_query("\"Lisbon trams\""), "Lisbon trams");
        assert_eq!(research_query("Lisbon trams"), "Lisbon trams");
    }
}
