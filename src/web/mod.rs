//! HTTP surface: the upload page, its assets and the generation endpoint.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::constants::GENERATE_PATH;
use crate::provider::ProviderHandle;

mod generate;
mod prelude;
mod views;

use generate::generate_handler;
use views::root_handler;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    provider: Arc<ProviderHandle>,
}

impl AppState {
    fn new(provider: ProviderHandle) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

fn create_router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(root_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/static/app.js", axum::routing::get(script_handler))
        .route(GENERATE_PATH, axum::routing::post(generate_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

async fn script_handler() -> impl IntoResponse {
    const SCRIPT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/app.js"));
    ([(CONTENT_TYPE, "text/javascript")], SCRIPT)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Binds the listener and serves until interrupted.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    provider: ProviderHandle,
    max_body_bytes: usize,
) -> Result<(), anyhow::Error> {
    if !provider.is_configured() {
        warn!("OPENAI_API_KEY is not set, generation requests will be refused");
    }
    let app = create_router(max_body_bytes).with_state(AppState::new(provider));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
