//! Fulfillment HTTP server: health probe and the webhook endpoint.

use crate::config::{self, Config};
use crate::dispatch::HandlerRegistry;
use crate::project::{self, WebhookResponse};
use crate::webhook::protocol::WebhookRequest;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the fulfillment server (config, handler registry).
/// Both are read-only once the server is up.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub registry: Arc<HandlerRegistry>,
}

/// Run the fulfillment server; binds to config.server.bind:config.server.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config, registry: HandlerRegistry) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let state = ServerState {
        config: Arc::new(config),
        registry: Arc::new(registry),
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/fulfillment", post(fulfillment_webhook))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("fulfillment server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("fulfillment server exited")?;
    log::info!("fulfillment server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.server.port,
    }))
}

/// POST /fulfillment — parse the NLU payload, dispatch by action, project the
/// handler's response for the calling surface.
///
/// A body that fails to parse is treated as an empty request and resolves to
/// the default handler; the caller always receives a well-formed reply.
async fn fulfillment_webhook(
    State(state): State<ServerState>,
    body: Bytes,
) -> Json<WebhookResponse> {
    let request_id = uuid::Uuid::new_v4();
    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("[{}] unparseable webhook body, using default request: {}", request_id, e);
            WebhookRequest::default()
        }
    };
    let request = request.into_fulfillment();
    log::info!(
        "[{}] action={} source={}",
        request_id,
        request.intent_key.as_deref().unwrap_or("default"),
        request.source.as_deref().unwrap_or("-")
    );

    let handler = state.registry.resolve(request.intent_key.as_deref());
    let model = handler(&request);
    let payload = match project::project(
        &model,
        request.source.as_deref(),
        &state.config.fulfillment.assistant_source,
    ) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("[{}] projection failed, sending fallback text: {}", request_id, e);
            fallback_payload(&state.config)
        }
    };
    Json(payload)
}

/// Last-resort payload when projection fails: the configured fallback text,
/// no attachments, no context updates.
fn fallback_payload(config: &Config) -> WebhookResponse {
    WebhookResponse {
        speech: config::resolve_fallback_speech(config),
        display_text: config::resolve_fallback_display(config),
        data: None,
        context_out: None,
    }
}
