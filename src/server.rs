use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr};

use crate::{api, error, info, management::SessionManager};

/// Assembles the dashboard router with the shared session extension.
pub fn build_router(session: SessionManager) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/error", get(api::auth_error))
        .route("/dashboard", get(api::dashboard))
        .route("/api/profile", get(api::profile))
        .route("/api/top-tracks", get(api::top_tracks))
        .route("/api/top-artists", get(api::top_artists))
        .route("/api/recently-played", get(api::recently_played))
        .route("/api/playlists", get(api::playlists))
        .route("/player/state", get(api::player_state))
        .route("/player/stream", get(api::player_stream))
        .route("/player/{action}", post(api::player_control))
        .layer(Extension(session))
}

/// Binds the listener and serves the dashboard until the process exits.
pub async fn start_server(addr: &str, session: SessionManager) {
    let app = build_router(session);

    let addr = match SocketAddr::from_str(addr) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    info!("Dashboard listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
