use crate::config;

/// Cookie name carrying the bearer token for the browser session.
pub const SESSION_COOKIE: &str = "spotify_access_token";

/// Default and maximum page sizes for the statistics proxy endpoints.
pub const DEFAULT_LIMIT: u8 = 10;
pub const MAX_LIMIT: u8 = 50;

/// Builds the `Set-Cookie` value installed by the OAuth callback.
///
/// The bearer token is stored as an HTTP-only, lax same-site cookie scoped
/// to the whole site with a lifetime matching the token's validity. The
/// `Secure` attribute is appended when requested.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax",
        name = SESSION_COOKIE,
        token = token,
        max_age = max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that removes the session cookie at logout.
pub fn expired_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        name = SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Convenience wrapper using the configured environment for the `Secure`
/// attribute.
pub fn session_cookie_for_env(token: &str, max_age_secs: u64) -> String {
    session_cookie(token, max_age_secs, config::cookie_secure())
}

/// Clamps an optional page-size query parameter into the provider's 1-50
/// window, defaulting to [`DEFAULT_LIMIT`].
pub fn clamp_limit(limit: Option<u8>) -> u8 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
