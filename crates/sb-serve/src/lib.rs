pub mod dedup;
pub mod middleware;
pub mod routes;
pub mod signature;

use crate::dedup::Deduplicator;
use axum::Router;
use sb_core::collaborators::LanguageModel;
use sb_core::Orchestrator;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub webhook_secret: Option<String>,
    pub dedup: Arc<Deduplicator>,
    pub orchestrator: Arc<Orchestrator>,
    pub model: Arc<dyn LanguageModel>,
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "switchboard listening");
    axum::serve(listener, app(state)).await
}
