use std::collections::HashMap;

use axum::{
    Extension,
    extract::Query,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};

use crate::{info, management::SessionManager, spotify, success, utils, warning};

/// Entry point of the OAuth flow: redirects the browser to the provider's
/// authorization endpoint with the configured client id, redirect URI and
/// scope list.
pub async fn login() -> Redirect {
    info!("Redirecting to provider authorization endpoint");
    Redirect::temporary(&spotify::auth::authorize_url())
}

/// OAuth callback: exchanges the authorization code for a token pair.
///
/// On success the session is installed, the bearer token is set as an
/// HTTP-only lax same-site cookie for the token's lifetime, and the browser
/// is redirected to the dashboard. A missing or empty `code` redirects to
/// the error page without ever calling the exchange; a failed exchange does
/// the same after logging the cause.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(session): Extension<SessionManager>,
) -> Response {
    let Some(code) = params.get("code").filter(|c| !c.is_empty()) else {
        warning!("{}", crate::error::DashboardError::MissingAuthCode);
        return Redirect::to("/error").into_response();
    };

    match spotify::auth::exchange_code(code).await {
        Ok(token) => {
            let cookie = utils::session_cookie_for_env(&token.access_token, token.expires_in);
            session.install(token).await;
            success!("Authentication successful");
            ([(SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response()
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Redirect::to("/error").into_response()
        }
    }
}

/// Tears the session down and expires the cookie.
pub async fn logout(Extension(session): Extension<SessionManager>) -> Response {
    session.clear().await;
    info!("Session cleared");
    let cookie = utils::expired_session_cookie(crate::config::cookie_secure());
    ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}
