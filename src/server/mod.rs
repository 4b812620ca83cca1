pub mod form;
pub mod handlers;
mod types;

pub use types::*;

use crate::{
    Result,
    config::Config,
    replicate::ReplicateClient,
    tryon::{InputNormalizer, TryOnService},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: handlers::AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/tryon", post(handlers::try_on))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let http = reqwest::Client::new();
    let client = ReplicateClient::new(&config.replicate, http.clone())?;
    info!("Using model {}", client.model());

    if let Some(dir) = &config.tryon.scratch_dir {
        tokio::fs::create_dir_all(dir).await?;
        info!("Scratch files go to {}", dir.display());
    }

    let service = TryOnService::new(
        InputNormalizer::new(http),
        Arc::new(client),
        config.tryon.scratch_dir.clone(),
    );

    let app_state = handlers::AppState {
        service: Arc::new(service),
    };
    let app = router(app_state, config.server.max_upload_bytes);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
