use async_trait::async_trait;
use thiserror::Error;

use crate::agent::memory::Exchange;

/// What the agent decided to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Call `tool` with `input`. `log` is the raw model text that produced it.
    Invoke {
        tool: String,
        input: String,
        log: String,
    },
    Finalize {
        output: String,
        log: String,
    },
}

/// A completed tool round: the action taken and what came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStep {
    pub tool: String,
    pub input: String,
    pub log: String,
    pub observation: String,
}

/// Everything the proposer may look at when choosing the next action.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub input: &'a str,
    pub chat_history: &'a [Exchange],
    pub intermediate_steps: &'a [AgentStep],
}

#[derive(Debug, Error)]
pub enum ProposalError {
    /// The model answered but not in the expected grammar. `observation` is
    /// fed back so the model can correct itself.
    #[error("Could not parse LLM output: `{llm_output}`")]
    OutputParsing {
        observation: String,
        llm_output: String,
    },

    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

/// Decides the next step of the reasoning loop
#[async_trait]
pub trait ActionProposer: Send + Sync {
    async fn propose_next_action(
        &self,
        turn: &TurnContext<'_>,
    ) -> Result<AgentAction, ProposalError>;
}
