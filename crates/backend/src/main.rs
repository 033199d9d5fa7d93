use std::sync::Arc;

use anyhow::Context;
use axum::{routing, Router};
use clap::Parser;
use log::info;
use simple_logger::SimpleLogger;
use tower_http::services::ServeDir;

use crate::{
    auth::{GuestIdentityProvider, IdentityProvider, SessionStore},
    config::Config,
    store::LobbyStore,
};

mod api;
mod auth;
mod config;
mod connection;
mod membership;
mod socket;
mod store;

pub struct AppState {
    pub store: LobbyStore,
    pub sessions: SessionStore,
    pub max_players: u8,
}

impl AppState {
    pub fn new(config: &Config, provider: impl IdentityProvider + 'static) -> Self {
        Self {
            store: LobbyStore::new(config.event_capacity).with_limit(config.max_lobbies),
            sessions: SessionStore::new(provider),
            max_players: config.max_players,
        }
    }
}

fn router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/api/login", routing::post(api::login))
        .route("/api/session", routing::get(api::session))
        .route("/api/logout", routing::post(api::logout))
        .route("/api/lobbies", routing::get(api::lobbies))
        .route("/healthz", routing::get(api::health))
        .route("/ws", routing::get(socket::websocket_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    SimpleLogger::new()
        .with_level(config.log_level)
        .env()
        .init()
        .context("failed to initialise logging")?;

    let state = Arc::new(AppState::new(&config, GuestIdentityProvider));
    let app = router(state, &config);

    let addr = config.addr();
    info!(
        "serving lobbies on http://{addr} (static files from {})",
        config.static_dir.display()
    );
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("server stopped")?;
    Ok(())
}
