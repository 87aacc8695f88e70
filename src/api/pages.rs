use axum::response::Html;

/// Landing page: the login entry point unauthenticated views redirect to.
pub async fn index() -> Html<&'static str> {
    Html("<h2>Spotidash</h2><p><a href=\"/login\">Log in with Spotify</a></p>")
}

/// Error page shown after an unrecoverable authentication failure.
pub async fn auth_error() -> Html<&'static str> {
    Html("<h4>Authentication failed.</h4><p><a href=\"/login\">Try again</a></p>")
}
