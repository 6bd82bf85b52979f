mod agent;
mod config;
mod error;
mod routes;
mod session;
mod state;
mod tools;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Credentials};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("travel_agent_backend=debug,tower_http=debug")),
        )
        .init();

    let credentials = Credentials::from_env()?;
    let config = Config::load()?;
    info!(
        "Loaded configuration: model={}, memory_window={}, session_capacity={}",
        config.agent_config.model, config.agent_config.memory_window, config.agent_config.session_capacity
    );

    let app_state = AppState::new(config.clone(), &credentials)?;
    let _sweeper = app_state
        .sessions
        .spawn_idle_sweeper(Duration::from_secs(config.agent_config.sweep_interval_secs));

    let app = routes::build_app(app_state);

    let addr = (config.system_config.host.as_str(), config.system_config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
