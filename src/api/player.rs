use std::{convert::Infallible, time::Duration};

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde_json::{Value, json};

use crate::{
    error::DashboardError,
    management::{PlaybackMonitor, SessionManager},
    spotify::{
        self,
        player::{ControlOptions, PlayerAction},
    },
    types::PlaybackState,
};

/// `GET /player/state` - point-in-time playback snapshot.
///
/// Answers 401 without a session, 404 when nothing is playing, and the raw
/// provider snapshot otherwise. Nothing is cached; every call hits the
/// provider.
pub async fn player_state(
    Extension(session): Extension<SessionManager>,
) -> Result<Json<PlaybackState>, DashboardError> {
    let playback = session
        .with_refresh(|token| async move { spotify::player::get_playback(&token).await })
        .await?;

    match playback {
        Some(state) => Ok(Json(state)),
        None => Err(DashboardError::NoActivePlayback),
    }
}

/// `POST /player/{action}` - playback command proxy.
///
/// Parses the action out of the fixed vocabulary, forwards it with its
/// options through the refresh guard, and collapses the provider's 204 into
/// `200 {"success":true}`. Failures surface as the error object produced by
/// [`DashboardError`], with the no-active-device condition as its own
/// user-actionable kind.
pub async fn player_control(
    Path(action): Path<String>,
    Extension(session): Extension<SessionManager>,
    body: Option<Json<ControlOptions>>,
) -> Result<(StatusCode, Json<Value>), DashboardError> {
    let action: PlayerAction = action.parse()?;
    let Json(options) = body.unwrap_or_default();

    session
        .with_refresh(|token| {
            let options = options.clone();
            async move { spotify::player::control_playback(&token, action, &options).await }
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

/// `GET /player/stream` - server-sent playback updates.
///
/// Spawns a [`PlaybackMonitor`] polling the provider once per second for as
/// long as the response stream stays open. Only changed snapshots (track id
/// or is-playing flag) are emitted; a `null` event means playback stopped.
/// Dropping the connection drops the monitor, which cancels the poll task.
pub async fn player_stream(
    Extension(session): Extension<SessionManager>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, DashboardError> {
    // Fail fast before spawning a poller for an unauthenticated client.
    session.bearer().await?;

    let poll_session = session.clone();
    let monitor = PlaybackMonitor::spawn(Duration::from_secs(1), move || {
        let session = poll_session.clone();
        async move {
            session
                .with_refresh(|token| async move { spotify::player::get_playback(&token).await })
                .await
        }
    });

    let rx = monitor.subscribe();
    let stream = futures::stream::unfold((monitor, rx), |(monitor, mut rx)| async move {
        if rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .json_data(snapshot.as_deref())
            .unwrap_or_default();
        Some((Ok::<_, Infallible>(event), (monitor, rx)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
