use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::stateless_llm::{
    EmbeddingInterface, OpenAICompatibleLLM, OpenAIEmbeddings, StatelessLLMInterface,
};
use crate::agent::AgentFactory;
use crate::config::{Config, Credentials};
use crate::session::SessionManager;
use crate::tools::hotel_search::HotelApiClient;
use crate::tools::web_research::{RecursiveCharacterTextSplitter, WebPageLoader, WebSearchClient};
use crate::tools::{HotelSearchTool, Tool, WebResearchTool};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Wire the upstream clients, both tools and the session cache.
    pub fn new(config: Config, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.system_config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let agent_config = &config.agent_config;
        let research_config = &config.research_config;

        let llm: Arc<dyn StatelessLLMInterface> = Arc::new(OpenAICompatibleLLM::new(
            client.clone(),
            agent_config.model.clone(),
            agent_config.openai_base_url.clone(),
            credentials.openai_api_key.clone(),
            agent_config.temperature,
        ));
        let research_llm: Arc<dyn StatelessLLMInterface> = Arc::new(OpenAICompatibleLLM::new(
            client.clone(),
            research_config.model.clone(),
            agent_config.openai_base_url.clone(),
            credentials.openai_api_key.clone(),
            0.0,
        ));
        let embeddings: Arc<dyn EmbeddingInterface> = Arc::new(OpenAIEmbeddings::new(
            client.clone(),
            research_config.embedding_model.clone(),
            agent_config.openai_base_url.clone(),
            credentials.openai_api_key.clone(),
        ));

        let hotel_search = HotelSearchTool::new(
            HotelApiClient::new(client.clone(), &config.hotel_config),
            credentials.rapidapi_key.clone(),
            config.hotel_config.max_results,
        );
        let web_research = WebResearchTool::new(
            WebSearchClient::new(
                client.clone(),
                research_config.search_base_url.clone(),
                credentials.tavily_api_key.clone(),
                research_config.max_results,
            ),
            WebPageLoader::new(client),
            RecursiveCharacterTextSplitter::new(
                research_config.chunk_size,
                research_config.chunk_overlap,
            )?,
            embeddings,
            research_llm,
            research_config.top_k,
        );

        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(hotel_search), Arc::new(web_research)];
        let factory = AgentFactory::new(llm, tools, agent_config);
        let sessions = SessionManager::new(
            factory,
            agent_config.session_capacity,
            Duration::from_secs(agent_config.session_idle_secs),
        );

        Ok(Self::with_sessions(config, sessions))
    }

    pub fn with_sessions(config: Config, sessions: SessionManager) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }
}
