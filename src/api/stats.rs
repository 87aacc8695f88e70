use axum::{
    Extension, Json,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::DashboardError,
    management::SessionManager,
    spotify,
    types::{Artist, Page, Playlist, Profile, RecentlyPlayedItem, TimeRange, Track},
    utils,
};

/// Query parameters shared by the statistics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub range: Option<TimeRange>,
    pub limit: Option<u8>,
}

pub async fn profile(
    Extension(session): Extension<SessionManager>,
) -> Result<Json<Profile>, DashboardError> {
    let profile = session
        .with_refresh(|token| async move { spotify::stats::get_profile(&token).await })
        .await?;
    Ok(Json(profile))
}

pub async fn top_tracks(
    Query(query): Query<StatsQuery>,
    Extension(session): Extension<SessionManager>,
) -> Result<Json<Page<Track>>, DashboardError> {
    let range = query.range.unwrap_or_default();
    let limit = utils::clamp_limit(query.limit);
    let page = session
        .with_refresh(|token| async move {
            spotify::stats::get_top_tracks(&token, range, limit).await
        })
        .await?;
    Ok(Json(page))
}

pub async fn top_artists(
    Query(query): Query<StatsQuery>,
    Extension(session): Extension<SessionManager>,
) -> Result<Json<Page<Artist>>, DashboardError> {
    let range = query.range.unwrap_or_default();
    let limit = utils::clamp_limit(query.limit);
    let page = session
        .with_refresh(|token| async move {
            spotify::stats::get_top_artists(&token, range, limit).await
        })
        .await?;
    Ok(Json(page))
}

pub async fn recently_played(
    Query(query): Query<StatsQuery>,
    Extension(session): Extension<SessionManager>,
) -> Result<Json<Page<RecentlyPlayedItem>>, DashboardError> {
    let limit = utils::clamp_limit(query.limit);
    let page = session
        .with_refresh(|token| async move {
            spotify::stats::get_recently_played(&token, limit).await
        })
        .await?;
    Ok(Json(page))
}

pub async fn playlists(
    Query(query): Query<StatsQuery>,
    Extension(session): Extension<SessionManager>,
) -> Result<Json<Page<Playlist>>, DashboardError> {
    let limit = utils::clamp_limit(query.limit);
    let page = session
        .with_refresh(|token| async move { spotify::stats::get_playlists(&token, limit).await })
        .await?;
    Ok(Json(page))
}

/// Aggregate view behind the callback redirect.
///
/// Fetches profile, both time-range buckets of top items, listening history
/// and playlists concurrently, mirroring the page-load fetch of a dashboard
/// view. Unauthenticated access redirects to the login entry point instead
/// of answering 401, since this is a protected view rather than an API
/// resource.
pub async fn dashboard(Extension(session): Extension<SessionManager>) -> Response {
    if !session.is_authenticated().await {
        return Redirect::to("/login").into_response();
    }

    let limit = utils::DEFAULT_LIMIT;
    let result = tokio::try_join!(
        session.with_refresh(|token| async move { spotify::stats::get_profile(&token).await }),
        session.with_refresh(|token| async move {
            spotify::stats::get_top_tracks(&token, TimeRange::ShortTerm, limit).await
        }),
        session.with_refresh(|token| async move {
            spotify::stats::get_top_artists(&token, TimeRange::ShortTerm, limit).await
        }),
        session.with_refresh(|token| async move {
            spotify::stats::get_recently_played(&token, limit).await
        }),
        session.with_refresh(|token| async move {
            spotify::stats::get_top_tracks(&token, TimeRange::LongTerm, limit).await
        }),
        session.with_refresh(|token| async move {
            spotify::stats::get_top_artists(&token, TimeRange::LongTerm, limit).await
        }),
        session.with_refresh(|token| async move {
            spotify::stats::get_playlists(&token, limit).await
        }),
    );

    match result {
        Ok((
            profile,
            top_tracks,
            top_artists,
            recently_played,
            top_tracks_all_time,
            top_artists_all_time,
            playlists,
        )) => Json(json!({
            "profile": profile,
            "top_tracks": top_tracks,
            "top_artists": top_artists,
            "recently_played": recently_played,
            "top_tracks_all_time": top_tracks_all_time,
            "top_artists_all_time": top_artists_all_time,
            "playlists": playlists,
        }))
        .into_response(),
        Err(DashboardError::Unauthorized) | Err(DashboardError::ReauthRequired) => {
            Redirect::to("/login").into_response()
        }
        Err(e) => e.into_response(),
    }
}
