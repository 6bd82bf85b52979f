use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::interface::{ActionProposer, AgentAction, AgentStep, ProposalError, TurnContext};
use crate::agent::memory::ConversationWindowMemory;
use crate::tools::{observe, Tool};

pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// Tool name recorded for steps that came from unparseable model output.
pub const EXCEPTION_TOOL: &str = "_Exception";

/// Runs the reasoning loop for one conversation, keeping its chat memory.
pub struct AgentExecutor {
    proposer: Box<dyn ActionProposer>,
    tools: Vec<Arc<dyn Tool>>,
    memory: ConversationWindowMemory,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(
        proposer: Box<dyn ActionProposer>,
        tools: Vec<Arc<dyn Tool>>,
        memory: ConversationWindowMemory,
        max_iterations: usize,
    ) -> Self {
        Self {
            proposer,
            tools,
            memory,
            max_iterations,
        }
    }

    pub fn memory(&self) -> &ConversationWindowMemory {
        &self.memory
    }

    /// Answer `input`, invoking tools as the model asks. Only model transport
    /// failures are returned as errors.
    pub async fn invoke(&mut self, input: &str) -> Result<String> {
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 0..self.max_iterations {
            let turn = TurnContext {
                input,
                chat_history: self.memory.exchanges(),
                intermediate_steps: &steps,
            };

            let step = match self.proposer.propose_next_action(&turn).await {
                Ok(AgentAction::Finalize { output, .. }) => {
                    info!("Agent finished after {} step(s)", iteration + 1);
                    self.memory.save_context(input, &output);
                    return Ok(output);
                }
                Ok(AgentAction::Invoke {
                    tool,
                    input: tool_input,
                    log,
                }) => {
                    let observation = self.run_tool(&tool, &tool_input).await;
                    AgentStep {
                        tool,
                        input: tool_input,
                        log,
                        observation,
                    }
                }
                Err(ProposalError::OutputParsing {
                    observation,
                    llm_output,
                }) => {
                    warn!("Could not parse LLM output: {}", observation);
                    AgentStep {
                        tool: EXCEPTION_TOOL.to_string(),
                        input: observation.clone(),
                        log: llm_output,
                        observation,
                    }
                }
                Err(ProposalError::Model(e)) => return Err(e),
            };
            debug!(
                "Step {}: {} with input {:?} observed: {}",
                iteration + 1,
                step.tool,
                step.input,
                step.observation
            );
            steps.push(step);
        }

        warn!("Agent hit the iteration limit ({})", self.max_iterations);
        self.memory.save_context(input, ITERATION_LIMIT_OUTPUT);
        Ok(ITERATION_LIMIT_OUTPUT.to_string())
    }

    async fn run_tool(&self, name: &str, input: &str) -> String {
        match self.tools.iter().find(|t| t.name() == name) {
            Some(tool) => observe(tool.as_ref(), input).await,
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.tools
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}
