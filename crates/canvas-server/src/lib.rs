//! HTTP and WebSocket front end of the canvas assistant
//!
//! Endpoints:
//! - `GET /healthcheck`: liveness
//! - `GET /models`: models the Ollama daemon has pulled
//! - `POST /text-prompt`: free-form prompt, streamed back as plain text
//! - `POST /image-prompt`: prompt about an uploaded image (multipart form)
//! - `POST /handle-visio-command`: run model output as canvas commands
//! - `POST /assistant`: route a user message to the action agent or chat
//! - `GET /ws/visio-command`: command processing over a WebSocket

pub mod assistant;
pub mod config;
pub mod constants;
pub mod error;
pub mod prompts;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use assistant::{Assistant, AssistantReply, Route};
pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use routes::router;
pub use state::{build_state, ActionLog, AppState};

/// Build the state from `config` and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let state = build_state(config).await?;

    if !state.gateway.health_check().await {
        log::warn!(
            "Ollama at {} is not responding; model calls will fail until it is running",
            state.gateway.base_url().unwrap_or_default()
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!(
        "Canvas assistant listening on http://{}",
        listener.local_addr()?
    );

    serve_with_shutdown(state, listener, shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves, then let in-flight
/// requests finish and flush the action log.
pub async fn serve_with_shutdown<F>(
    state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let action_log = state.action_log.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("Server stopped; flushing action log");
    action_log.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown requested"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            // Never resolve, or the server would stop right away
            std::future::pending::<()>().await;
        }
    }
}
