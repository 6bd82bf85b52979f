use chrono::Local;
use std::sync::Arc;
use tracing::info;

use crate::agent::executor::AgentExecutor;
use crate::agent::memory::ConversationWindowMemory;
use crate::agent::prompts::travel_system_prompt;
use crate::agent::react_proposer::ReActProposer;
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::config::AgentConfig;
use crate::tools::Tool;

/// Builds a fresh travel agent for each new session.
pub struct AgentFactory {
    llm: Arc<dyn StatelessLLMInterface>,
    tools: Vec<Arc<dyn Tool>>,
    memory_window: usize,
    max_iterations: usize,
}

impl AgentFactory {
    pub fn new(
        llm: Arc<dyn StatelessLLMInterface>,
        tools: Vec<Arc<dyn Tool>>,
        agent_config: &AgentConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            memory_window: agent_config.memory_window,
            max_iterations: agent_config.max_iterations,
        }
    }

    /// Create an agent bound to both tools, with its own window memory and a
    /// system prompt stamped with today's date.
    pub fn create_agent(&self, session_id: &str) -> AgentExecutor {
        info!("Creating new agent for session_id: {}", session_id);

        let system = travel_system_prompt(Local::now().date_naive());
        let described: Vec<(&str, &str)> = self
            .tools
            .iter()
            .map(|tool| (tool.name(), tool.description()))
            .collect();
        let proposer = ReActProposer::new(self.llm.clone(), system, &described);

        AgentExecutor::new(
            Box::new(proposer),
            self.tools.clone(),
            ConversationWindowMemory::new(self.memory_window),
            self.max_iterations,
        )
    }
}
