use reqwest::Client;

use crate::{
    config,
    error::DashboardError,
    spotify::check_status,
    types::{Artist, Page, Playlist, Profile, RecentlyPlayedItem, TimeRange, Track},
};

/// Retrieves the authenticated user's profile.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
pub async fn get_profile(token: &str) -> Result<Profile, DashboardError> {
    let api_url = format!("{uri}/me", uri = &config::spotify_apiurl());

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<Profile>().await?)
}

/// Retrieves the user's most played tracks for a time-range bucket.
///
/// Fixed page size, no pagination: the dashboard shows a single page of top
/// items per bucket ("last 4 weeks" vs "all time").
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
/// * `range` - Time-range bucket the ranking is computed over
/// * `limit` - Maximum number of tracks to return (1-50)
pub async fn get_top_tracks(
    token: &str,
    range: TimeRange,
    limit: u8,
) -> Result<Page<Track>, DashboardError> {
    let api_url = format!(
        "{uri}/me/top/tracks?limit={limit}&time_range={range}",
        uri = &config::spotify_apiurl(),
        limit = limit,
        range = range.as_param()
    );

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<Page<Track>>().await?)
}

/// Retrieves the user's most played artists for a time-range bucket.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
/// * `range` - Time-range bucket the ranking is computed over
/// * `limit` - Maximum number of artists to return (1-50)
pub async fn get_top_artists(
    token: &str,
    range: TimeRange,
    limit: u8,
) -> Result<Page<Artist>, DashboardError> {
    let api_url = format!(
        "{uri}/me/top/artists?limit={limit}&time_range={range}",
        uri = &config::spotify_apiurl(),
        limit = limit,
        range = range.as_param()
    );

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<Page<Artist>>().await?)
}

/// Retrieves the user's recently played tracks.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
/// * `limit` - Maximum number of history entries to return (1-50)
pub async fn get_recently_played(
    token: &str,
    limit: u8,
) -> Result<Page<RecentlyPlayedItem>, DashboardError> {
    let api_url = format!(
        "{uri}/me/player/recently-played?limit={limit}",
        uri = &config::spotify_apiurl(),
        limit = limit
    );

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<Page<RecentlyPlayedItem>>().await?)
}

/// Retrieves the user's playlists.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
/// * `limit` - Maximum number of playlists to return (1-50)
pub async fn get_playlists(token: &str, limit: u8) -> Result<Page<Playlist>, DashboardError> {
    let api_url = format!(
        "{uri}/me/playlists?limit={limit}",
        uri = &config::spotify_apiurl(),
        limit = limit
    );

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<Page<Playlist>>().await?)
}
