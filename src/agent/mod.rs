pub mod agent_factory;
pub mod executor;
pub mod interface;
pub mod memory;
pub mod output_parser;
pub mod prompts;
pub mod react_proposer;

pub mod stateless_llm;

pub use agent_factory::AgentFactory;
pub use executor::AgentExecutor;
