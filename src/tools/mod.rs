pub mod hotel_search;
pub mod web_research;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub use hotel_search::HotelSearchTool;
pub use web_research::WebResearchTool;

/// Why a tool call failed. Rendered to text only when it becomes an
/// observation for the reasoning loop.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Error: {0}")]
    InvalidInput(String),

    #[error("Error: {0} is not configured.")]
    MissingCredential(&'static str),

    /// The upstream answered, but with nothing usable for this request.
    #[error("{0}")]
    NotFound(String),

    #[error("Error making API request: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Unexpected(format!("malformed response: {}", err))
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        ToolError::Unexpected(format!("{:#}", err))
    }
}

pub type ToolResult = Result<String, ToolError>;

/// A capability the agent can invoke with a single string input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model writes after `Action:`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    async fn run(&self, input: &str) -> ToolResult;

    /// Render a failure as observation text.
    fn describe_error(&self, error: &ToolError) -> String {
        error.to_string()
    }
}

/// Run a tool and flatten its result into the text the model will observe.
pub async fn observe(tool: &dyn Tool, input: &str) -> String {
    match tool.run(input).await {
        Ok(output) => output,
        Err(e) => {
            debug!("Tool {} failed: {}", tool.name(), e);
            tool.describe_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn run(&self, input: &str) -> ToolResult {
            Err(ToolError::NotFound(format!("nothing for {}", input)))
        }
    }

    #[test]
    fn error_kinds_render_with_their_prefixes() {
        assert_eq!(
            ToolError::InvalidInput("bad".into()).to_string(),
            "Error: bad"
        );
        assert_eq!(
            ToolError::MissingCredential("RapidAPI Key").to_string(),
            "Error: RapidAPI Key is not configured."
        );
        assert!(ToolError::Unexpected("boom".into())
            .to_string()
            .starts_with("An unexpected error occurred"));
    }

    #[tokio::test]
    async fn observe_turns_errors_into_text() {
        assert_eq!(observe(&Failing, "Rome").await, "nothing for Rome");
    }
}
