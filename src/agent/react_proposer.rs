use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::agent::interface::{ActionProposer, AgentAction, AgentStep, ProposalError, TurnContext};
use crate::agent::memory::render_history;
use crate::agent::output_parser::parse_react_output;
use crate::agent::prompts::{render_template, REACT_CHAT_TEMPLATE};
use crate::agent::stateless_llm::{Message, StatelessLLMInterface};

pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Proposes actions by prompting a chat model with the ReAct-chat template.
pub struct ReActProposer {
    llm: Arc<dyn StatelessLLMInterface>,
    system: String,
    tools: String,
    tool_names: String,
}

impl ReActProposer {
    /// `tools` is a list of (name, description) pairs.
    pub fn new(llm: Arc<dyn StatelessLLMInterface>, system: String, tools: &[(&str, &str)]) -> Self {
        Self {
            llm,
            system,
            tools: tools
                .iter()
                .map(|(name, description)| format!("{}: {}", name, description))
                .collect::<Vec<_>>()
                .join("\n"),
            tool_names: tools
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn render_prompt(&self, turn: &TurnContext<'_>) -> String {
        let chat_history = render_history(turn.chat_history);
        let scratchpad = render_scratchpad(turn.intermediate_steps);
        let vars = HashMap::from([
            ("tools", self.tools.as_str()),
            ("tool_names", self.tool_names.as_str()),
            ("chat_history", chat_history.as_str()),
            ("input", turn.input),
            ("agent_scratchpad", scratchpad.as_str()),
        ]);
        render_template(REACT_CHAT_TEMPLATE, &vars)
    }
}

/// Replay previous steps as `<log>\nObservation: <obs>\nThought: `.
pub fn render_scratchpad(steps: &[AgentStep]) -> String {
    steps
        .iter()
        .map(|step| format!("{}\nObservation: {}\nThought: ", step.log, step.observation))
        .collect()
}

#[async_trait]
impl ActionProposer for ReActProposer {
    async fn propose_next_action(
        &self,
        turn: &TurnContext<'_>,
    ) -> Result<AgentAction, ProposalError> {
        let prompt = self.render_prompt(turn);
        let output = self
            .llm
            .chat_completion(
                vec![Message::user(prompt)],
                Some(&self.system),
                &[OBSERVATION_STOP],
            )
            .await?;
        debug!("LLM output: {}", output);
        parse_react_output(&output)
    }
}
