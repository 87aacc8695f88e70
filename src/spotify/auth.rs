use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::{config, error::DashboardError, types::Token};

/// Builds the provider authorization URL the login route redirects to.
///
/// Encodes the client id, the configured redirect URI, and the fixed scope
/// list as query parameters of the provider's authorize endpoint. The state
/// of the flow lives entirely at the provider until the callback returns
/// with an authorization code.
///
/// # Example
///
/// ```
/// let url = authorize_url();
/// // https://accounts.spotify.com/authorize?client_id=...&response_type=code&...
/// ```
pub fn authorize_url() -> String {
    format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}&show_dialog=true",
        auth_url = &config::spotify_apiauth_url(),
        client_id = &config::spotify_client_id(),
        redirect_uri = &config::spotify_redirect_uri(),
        scope = config::spotify_scope().replace(' ', "%20")
    )
}

/// Exchanges an authorization code for a token pair.
///
/// Completes the OAuth 2.0 authorization-code flow by posting the code to
/// the provider's token endpoint as a form-encoded request authenticated
/// with HTTP Basic client credentials. This is the final step of the login
/// flow and the only place a bearer token is minted from a code.
///
/// # Arguments
///
/// * `code` - Authorization code received from the OAuth callback
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Token)` - Bearer token, refresh credential (when granted), scope
///   and expiry metadata, stamped with the current time
/// - `Err(DashboardError)` - Transport failure or a provider response
///   without an access token
///
/// # Error Conditions
///
/// - Invalid or expired authorization code (single-use, short-lived)
/// - Redirect URI mismatch with the registered application
/// - Network connectivity issues or provider service errors
pub async fn exchange_code(code: &str) -> Result<Token, DashboardError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .basic_auth(
            config::spotify_client_id(),
            Some(config::spotify_client_secret()),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config::spotify_redirect_uri()),
        ])
        .send()
        .await?;

    let json: Value = res.json().await?;
    token_from_response(&json)
}

/// Refreshes an expired bearer token using a refresh credential.
///
/// Exchanges a refresh credential for a new bearer token with the
/// `refresh_token` grant. The provider may rotate the refresh credential; a
/// missing `refresh_token` field in the response means the previous
/// credential stays valid and should be kept by the caller.
///
/// # Arguments
///
/// * `refresh_token` - Valid refresh credential from a previous exchange
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Token)` - Fresh bearer token with updated expiry metadata
/// - `Err(DashboardError::TokenExchange)` - Refresh rejected by the provider
/// - `Err(DashboardError::Provider)` - Transport failure
pub async fn refresh_token(refresh_token: &str) -> Result<Token, DashboardError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .basic_auth(
            config::spotify_client_id(),
            Some(config::spotify_client_secret()),
        )
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let json: Value = res.json().await?;
    token_from_response(&json)
}

fn token_from_response(json: &Value) -> Result<Token, DashboardError> {
    let Some(access_token) = json["access_token"].as_str() else {
        let detail = json["error_description"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .unwrap_or("no access token in response");
        return Err(DashboardError::TokenExchange(detail.to_string()));
    };

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"].as_str().map(|s| s.to_string()),
        scope: json["scope"].as_str().map(|s| s.to_string()),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
