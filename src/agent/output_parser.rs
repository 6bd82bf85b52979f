use regex::Regex;
use std::sync::OnceLock;

use crate::agent::interface::{AgentAction, ProposalError};

pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

pub const MISSING_ACTION_AFTER_THOUGHT: &str =
    "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT_AFTER_ACTION: &str =
    "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const INVALID_RESPONSE: &str = "Invalid or incomplete response";

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action regex")
    })
}

fn action_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Action\s*\d*\s*:").expect("action-only regex"))
}

fn action_input_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Action\s*\d*\s*Input\s*\d*\s*:").expect("action input regex"))
}

/// Parse model text written in the `Thought / Action / Action Input` or
/// `Thought / Final Answer` format.
pub fn parse_react_output(text: &str) -> Result<AgentAction, ProposalError> {
    let includes_answer = text.contains(FINAL_ANSWER_ACTION);

    if let Some(caps) = action_regex().captures(text) {
        if includes_answer {
            // Both a final answer and an action: ambiguous, ask again.
            return Err(parse_error(INVALID_RESPONSE, text));
        }
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim();
        let input = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_matches('"');
        return Ok(AgentAction::Invoke {
            tool: tool.to_string(),
            input: input.to_string(),
            log: text.to_string(),
        });
    }

    if includes_answer {
        let output = text
            .rsplit(FINAL_ANSWER_ACTION)
            .next()
            .unwrap_or_default()
            .trim();
        return Ok(AgentAction::Finalize {
            output: output.to_string(),
            log: text.to_string(),
        });
    }

    if !action_only_regex().is_match(text) {
        Err(parse_error(MISSING_ACTION_AFTER_THOUGHT, text))
    } else if !action_input_regex().is_match(text) {
        Err(parse_error(MISSING_ACTION_INPUT_AFTER_ACTION, text))
    } else {
        Err(parse_error(INVALID_RESPONSE, text))
    }
}

fn parse_error(observation: &str, text: &str) -> ProposalError {
    ProposalError::OutputParsing {
        observation: observation.to_string(),
        llm_output: text.to_string(),
    }
}
