use axum::{
    Router,
    routing::{get, put},
};
use engine::Currency;
use url::Url;

use std::sync::Arc;

use crate::{graph, items};

/// Settings the HTTP surface needs. No application state lives here: every
/// request carries its own state in the `data` query parameter.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Public address of the page; share links are built on it.
    pub public_url: Url,
    pub currency: Currency,
}

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(config: ServerConfig) -> Router {
    let state = ServerState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(items::get_state))
        .route("/api/share", get(items::share))
        .route("/api/graph", get(graph::get_graph))
        .route("/api/summary", get(graph::get_summary))
        .route(
            "/api/{side}",
            put(items::replace).post(items::add),
        )
        .route(
            "/api/{side}/{id}",
            put(items::edit).delete(items::remove),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(config)).await
}

pub fn spawn_with_listener(
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
