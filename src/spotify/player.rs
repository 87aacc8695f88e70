use axum::http::StatusCode;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    config,
    error::DashboardError,
    spotify::check_status,
    types::{Device, DevicesResponse, PlaybackState, RepeatState},
};

/// The fixed playback command vocabulary accepted by the control proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Play,
    Pause,
    Next,
    Previous,
    Shuffle,
    Repeat,
    Seek,
}

impl PlayerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerAction::Play => "play",
            PlayerAction::Pause => "pause",
            PlayerAction::Next => "next",
            PlayerAction::Previous => "previous",
            PlayerAction::Shuffle => "shuffle",
            PlayerAction::Repeat => "repeat",
            PlayerAction::Seek => "seek",
        }
    }
}

impl std::str::FromStr for PlayerAction {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlayerAction::Play),
            "pause" => Ok(PlayerAction::Pause),
            "next" => Ok(PlayerAction::Next),
            "previous" => Ok(PlayerAction::Previous),
            "shuffle" => Ok(PlayerAction::Shuffle),
            "repeat" => Ok(PlayerAction::Repeat),
            "seek" => Ok(PlayerAction::Seek),
            other => Err(DashboardError::UnknownAction(other.to_string())),
        }
    }
}

/// Action-specific options carried in the control request body.
///
/// `state` is a boolean for `shuffle` and a repeat mode for `repeat`;
/// `position_ms` belongs to `seek` and `context_uri` optionally to `play`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlOptions {
    pub state: Option<ToggleState>,
    pub position_ms: Option<u64>,
    pub context_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ToggleState {
    Flag(bool),
    Mode(RepeatState),
}

/// A fully resolved provider control request: transport verb, path under the
/// API base, query parameters, and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

/// Translates a command and its options into the provider request.
///
/// The provider splits the vocabulary across two verbs: skip actions
/// (`next`, `previous`) are POSTs, set actions (`play`, `pause`, `shuffle`,
/// `repeat`, `seek`) are PUTs. Required options are validated here so an
/// invalid command never reaches the network.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidOptions`] when `shuffle` or `repeat` is
/// missing (or carries the wrong kind of) `state`, or when `seek` is missing
/// `position_ms`.
pub fn build_command(
    action: PlayerAction,
    options: &ControlOptions,
) -> Result<CommandRequest, DashboardError> {
    let request = match action {
        PlayerAction::Play => CommandRequest {
            method: Method::PUT,
            path: "/me/player/play",
            query: Vec::new(),
            body: options
                .context_uri
                .as_ref()
                .map(|uri| json!({ "context_uri": uri })),
        },
        PlayerAction::Pause => CommandRequest {
            method: Method::PUT,
            path: "/me/player/pause",
            query: Vec::new(),
            body: None,
        },
        PlayerAction::Next => CommandRequest {
            method: Method::POST,
            path: "/me/player/next",
            query: Vec::new(),
            body: None,
        },
        PlayerAction::Previous => CommandRequest {
            method: Method::POST,
            path: "/me/player/previous",
            query: Vec::new(),
            body: None,
        },
        PlayerAction::Shuffle => {
            let Some(ToggleState::Flag(state)) = options.state else {
                return Err(DashboardError::InvalidOptions {
                    action: "shuffle",
                    reason: "a boolean `state` is required".to_string(),
                });
            };
            CommandRequest {
                method: Method::PUT,
                path: "/me/player/shuffle",
                query: vec![("state", state.to_string())],
                body: None,
            }
        }
        PlayerAction::Repeat => {
            let Some(ToggleState::Mode(mode)) = options.state else {
                return Err(DashboardError::InvalidOptions {
                    action: "repeat",
                    reason: "a `state` of off, track or context is required".to_string(),
                });
            };
            CommandRequest {
                method: Method::PUT,
                path: "/me/player/repeat",
                query: vec![("state", mode.as_str().to_string())],
                body: None,
            }
        }
        PlayerAction::Seek => {
            let Some(position_ms) = options.position_ms else {
                return Err(DashboardError::InvalidOptions {
                    action: "seek",
                    reason: "a non-negative `position_ms` is required".to_string(),
                });
            };
            CommandRequest {
                method: Method::PUT,
                path: "/me/player/seek",
                query: vec![("position_ms", position_ms.to_string())],
                body: None,
            }
        }
    };

    Ok(request)
}

/// Picks the active output device from a device list.
///
/// The distinguished no-active-device condition covers both an empty list
/// and a list where every device is inactive.
pub fn active_device(devices: &[Device]) -> Result<&Device, DashboardError> {
    devices
        .iter()
        .find(|d| d.is_active)
        .ok_or(DashboardError::NoActiveDevice)
}

/// Retrieves the current playback snapshot.
///
/// A 204 (or empty body) from the provider means nothing is playing and
/// yields `Ok(None)`; the snapshot is never cached, each call is
/// authoritative only at fetch time.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
pub async fn get_playback(token: &str) -> Result<Option<PlaybackState>, DashboardError> {
    let api_url = format!("{uri}/me/player", uri = &config::spotify_apiurl());

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    if response.status() == reqwest::StatusCode::NO_CONTENT {
        return Ok(None);
    }

    decode_playback(&response.text().await?)
}

/// Decodes a playback response body, treating an empty body like a 204.
pub fn decode_playback(body: &str) -> Result<Option<PlaybackState>, DashboardError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

/// Retrieves the user's available output devices.
pub async fn get_devices(token: &str) -> Result<Vec<Device>, DashboardError> {
    let api_url = format!("{uri}/me/player/devices", uri = &config::spotify_apiurl());

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;
    let response = check_status(response).await?;

    Ok(response.json::<DevicesResponse>().await?.devices)
}

/// Issues a playback control command against the provider.
///
/// Performs the device-presence pre-check first: when no device is active
/// the distinguished [`DashboardError::NoActiveDevice`] is returned and the
/// control call is never issued. On success the provider's status code is
/// returned (204 for accepted commands). Commands are not queued or
/// debounced; concurrent commands race at the provider.
///
/// # Arguments
///
/// * `token` - Valid bearer token for Spotify API authentication
/// * `action` - One of the fixed command vocabulary
/// * `options` - Action-specific options from the request body
pub async fn control_playback(
    token: &str,
    action: PlayerAction,
    options: &ControlOptions,
) -> Result<StatusCode, DashboardError> {
    let devices = get_devices(token).await?;
    active_device(&devices)?;

    let command = build_command(action, options)?;
    let api_url = format!(
        "{uri}{path}",
        uri = &config::spotify_apiurl(),
        path = command.path
    );

    let client = Client::new();
    let mut request = client
        .request(command.method.clone(), &api_url)
        .bearer_auth(token)
        .query(&command.query);
    if let Some(body) = &command.body {
        request = request.json(body);
    }

    let response = request.send().await?;

    // The provider answers 404 on the player endpoints when the device
    // disappeared between the pre-check and the command.
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(DashboardError::NoActiveDevice);
    }
    let response = check_status(response).await?;

    Ok(StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::OK))
}
