//! Configuration management for the Spotify dashboard server.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials, the
//! server bind address, and provider endpoint URLs.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (provider URLs, scope, bind address)

use std::{env, path::PathBuf};

/// Default OAuth scope list requested during login.
///
/// Covers profile access, top-items and recently-played reads, playlist
/// reads, and playback state/control. Override with `SPOTIFY_API_AUTH_SCOPE`.
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email user-top-read \
user-read-recently-played user-read-currently-playing user-read-playback-state \
user-modify-playback-state playlist-read-private playlist-read-collaborative";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spotidash/.env`. If no file exists there, a
/// `.env` in the current working directory is used instead. This allows
/// users to store credentials without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spotidash/.env`
/// - macOS: `~/Library/Application Support/spotidash/.env`
/// - Windows: `%LOCALAPPDATA%/spotidash/.env`
///
/// # Returns
///
/// Returns `Ok(())` if an environment file is successfully loaded or none is
/// present, or an error string if directory creation fails.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotidash/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(path).map_err(|e| e.to_string())?;
    } else {
        // Fall back to a .env next to the binary; absent is fine since all
        // values may come from the process environment.
        dotenv::dotenv().ok();
    }
    Ok(())
}

/// Returns the address and port the dashboard server binds to.
///
/// Reads the `SERVER_ADDRESS` environment variable, defaulting to
/// `127.0.0.1:8080`.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8080"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable. The
/// secret is sent as HTTP Basic credentials during code exchange and token
/// refresh.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable is not set.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// Returns the Spotify OAuth redirect URI.
///
/// Retrieves the `SPOTIFY_API_REDIRECT_URI` environment variable which
/// specifies the callback URL that Spotify should redirect to after user
/// authorization. This must match the redirect URI registered in the Spotify
/// application settings and point at this server's `/callback` route.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the OAuth scope permissions requested during login.
///
/// Reads `SPOTIFY_API_AUTH_SCOPE`, defaulting to [`DEFAULT_SCOPE`].
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL.
///
/// Reads `SPOTIFY_API_AUTH_URL`, defaulting to the public accounts endpoint.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, defaulting to the public accounts endpoint.
/// Used both for the authorization-code exchange and for refresh grants.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, defaulting to `https://api.spotify.com/v1`. This
/// is used for all API operations after authentication.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns whether session cookies should carry the `Secure` attribute.
///
/// Reads `APP_ENV`; any value other than `production` yields `false` so that
/// local plain-HTTP development keeps working.
pub fn cookie_secure() -> bool {
    env::var("APP_ENV").map(|v| v == "production").unwrap_or(false)
}
