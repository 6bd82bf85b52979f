use anyhow::{Context, Result};
use ::config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../config/default.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub system_config: SystemConfig,
    pub agent_config: AgentConfig,
    pub hotel_config: HotelConfig,
    pub research_config: ResearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub host: String,
    pub port: u16,
    /// Timeout applied to every upstream HTTP call.
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub openai_base_url: String,
    /// Number of past exchanges kept in each session's prompt.
    pub memory_window: usize,
    pub max_iterations: usize,
    pub session_capacity: usize,
    pub session_idle_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelConfig {
    pub base_url: String,
    pub api_host: String,
    pub currency: String,
    pub locale: String,
    pub site_id: u64,
    pub results_size: u32,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub search_base_url: String,
    pub max_results: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub model: String,
    pub embedding_model: String,
}

impl Config {
    /// Load configuration: built-in defaults, then `CONFIG_PATH` (or an
    /// optional `conf.{yaml,json,toml}` in the working directory), then
    /// `TRAVEL_AGENT_*` environment variables.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").ok();
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&str>) -> Result<Self> {
        Self::load_layered(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("TRAVEL_AGENT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(path: Option<&str>, environment: Environment) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml));

        builder = match path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("conf").required(false)),
        };

        let settings = builder
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only, ignoring files and environment.
    pub fn defaults() -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let research = &self.research_config;
        if research.chunk_overlap >= research.chunk_size {
            anyhow::bail!(
                "Got a larger chunk overlap ({}) than chunk size ({}), should be smaller.",
                research.chunk_overlap,
                research.chunk_size
            );
        }
        if self.agent_config.max_iterations == 0 {
            anyhow::bail!("agent_config.max_iterations must be at least 1");
        }
        if self.agent_config.session_capacity == 0 {
            anyhow::bail!("agent_config.session_capacity must be at least 1");
        }
        if self.agent_config.sweep_interval_secs == 0 {
            anyhow::bail!("agent_config.sweep_interval_secs must be at least 1");
        }
        Ok(())
    }
}

/// API keys read from the environment. The model and search keys are required
/// at startup; the hotel key is only checked when the hotel tool runs.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub tavily_api_key: String,
    pub rapidapi_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable not set.", name))
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            tavily_api_key: required("TAVILY_API_KEY")?,
            rapidapi_key: lookup("RAPIDAPI_KEY").filter(|value| !value.trim().is_empty()),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .field("rapidapi_key", &self.rapidapi_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
