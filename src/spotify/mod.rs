//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! dashboard server. It implements the OAuth 2.0 authorization-code flow,
//! listening-statistics retrieval, and playback state/control operations.
//! All HTTP communication with the provider happens here.
//!
//! ## Architecture
//!
//! The module follows a feature-based organization where each submodule
//! handles a specific domain of Spotify API functionality:
//!
//! ```text
//! HTTP Handlers (api) / Session Guard (management)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (code exchange, token refresh)
//!     ├── Stats (profile, top items, recently played, playlists)
//!     └── Player (playback state, devices, control commands)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Exchanges an authorization code for a token pair using HTTP
//!   Basic client credentials, and refreshes expired bearer tokens with the
//!   `refresh_token` grant.
//! - [`stats`] - Stateless request builders for the read-only statistics
//!   endpoints. Each function takes a bearer token and fixed query
//!   parameters and returns the parsed provider payload unchanged.
//! - [`player`] - Playback snapshot and device queries plus the control
//!   command vocabulary (play, pause, next, previous, shuffle, repeat,
//!   seek), including the provider's verb split between skip actions (POST)
//!   and set actions (PUT).
//!
//! ## Error Handling
//!
//! Functions return [`DashboardError`](crate::error::DashboardError). A 401
//! from the provider is always mapped to `Unauthorized` so the session
//! refresh guard can recover it exactly once; other non-success statuses
//! surface as `ProviderStatus` with the provider's error message. There is
//! no retry or backoff at this layer.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - code exchange and refresh operations
//! - `GET /me` - user profile
//! - `GET /me/top/{tracks,artists}` - top items per time range
//! - `GET /me/player/recently-played` - listening history
//! - `GET /me/playlists` - user playlists
//! - `GET /me/player` - playback snapshot
//! - `GET /me/player/devices` - available output devices
//! - `PUT|POST /me/player/*` - playback control

pub mod auth;
pub mod player;
pub mod stats;

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::DashboardError;

/// Validates a provider response status before the body is consumed.
///
/// Maps 401 to [`DashboardError::Unauthorized`] so the refresh guard can
/// react, and turns any other non-success status into
/// [`DashboardError::ProviderStatus`] carrying the message from the
/// provider's JSON error envelope when one is present.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, DashboardError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(DashboardError::Unauthorized);
    }
    if status.is_client_error() || status.is_server_error() {
        let message = provider_message(response).await;
        return Err(DashboardError::ProviderStatus {
            status: StatusCode::from_u16(status.as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            message,
        });
    }
    Ok(response)
}

/// Extracts `error.message` from a provider error body, falling back to the
/// raw text or a placeholder.
async fn provider_message(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => match serde_json::from_str::<Value>(&body) {
            Ok(json) => json["error"]["message"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or(body),
            Err(_) => body,
        },
        Err(_) => "no error message provided".to_string(),
    }
}
