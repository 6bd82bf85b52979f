use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

pub fn create_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// CORS for the configured frontend origins, with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.system_config.cors_origins);
    create_routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let span = info_span!(
        "chat",
        session_id = %request.session_id,
        run_id = %Uuid::new_v4()
    );

    async move {
        info!("Received query: {}", request.query);
        let agent = state.sessions.get_or_create(&request.session_id);
        let response = agent.lock().await.invoke(&request.query).await?;

        Ok::<_, AppError>(Json(ChatResponse {
            response,
            session_id: request.session_id,
        }))
    }
    .instrument(span)
    .await
}
