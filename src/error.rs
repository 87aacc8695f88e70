//! Error kinds for the dashboard server and their HTTP mapping.
//!
//! Every failure the server can surface is a [`DashboardError`] variant. The
//! [`IntoResponse`] implementation turns each kind into the JSON error body
//! and status code the HTTP surface promises: authorization failures map to
//! 401, the distinguished no-active-device condition maps to a 404 with a
//! machine-readable `reason`, invalid commands map to 400, and provider
//! failures carry the provider's status through.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::warning;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// The OAuth callback arrived without an authorization code.
    #[error("authorization code missing from callback")]
    MissingAuthCode,

    /// The code-for-token exchange with the provider failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// No session is present, or the provider rejected the bearer token.
    #[error("bearer token missing or rejected")]
    Unauthorized,

    /// The refresh credential is gone or the refresh exchange failed. The
    /// stored credentials have been cleared; the user must log in again.
    #[error("re-authentication required")]
    ReauthRequired,

    /// The provider has no registered output device to receive commands.
    #[error("no active playback device")]
    NoActiveDevice,

    /// Nothing is currently playing on the user's account.
    #[error("no active playback")]
    NoActivePlayback,

    /// The `{action}` path segment is not part of the command vocabulary.
    #[error("unsupported player action: {0}")]
    UnknownAction(String),

    /// The options payload is missing or malformed for the given action.
    #[error("invalid options for {action}: {reason}")]
    InvalidOptions { action: &'static str, reason: String },

    /// Transport-level failure talking to the provider.
    #[error("provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    /// The provider payload could not be decoded.
    #[error("failed to decode provider payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    ProviderStatus { status: StatusCode, message: String },
}

impl DashboardError {
    /// Short machine-readable kind used in JSON error bodies.
    pub fn reason(&self) -> &'static str {
        match self {
            DashboardError::MissingAuthCode => "MISSING_AUTH_CODE",
            DashboardError::TokenExchange(_) => "TOKEN_EXCHANGE_FAILED",
            DashboardError::Unauthorized => "UNAUTHORIZED",
            DashboardError::ReauthRequired => "REAUTH_REQUIRED",
            DashboardError::NoActiveDevice => "NO_ACTIVE_DEVICE",
            DashboardError::NoActivePlayback => "NO_ACTIVE_PLAYBACK",
            DashboardError::UnknownAction(_) => "UNKNOWN_ACTION",
            DashboardError::InvalidOptions { .. } => "INVALID_OPTIONS",
            DashboardError::Provider(_) => "PROVIDER_ERROR",
            DashboardError::Decode(_) => "PROVIDER_ERROR",
            DashboardError::ProviderStatus { .. } => "PROVIDER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            DashboardError::MissingAuthCode => StatusCode::BAD_REQUEST,
            DashboardError::TokenExchange(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Unauthorized | DashboardError::ReauthRequired => {
                StatusCode::UNAUTHORIZED
            }
            DashboardError::NoActiveDevice | DashboardError::NoActivePlayback => {
                StatusCode::NOT_FOUND
            }
            DashboardError::UnknownAction(_) | DashboardError::InvalidOptions { .. } => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Provider(_) | DashboardError::Decode(_) => StatusCode::BAD_GATEWAY,
            DashboardError::ProviderStatus { status, .. } => *status,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        warning!("{}", self);
        let body = Json(json!({
            "error": self.to_string(),
            "reason": self.reason(),
        }));
        (self.status(), body).into_response()
    }
}
