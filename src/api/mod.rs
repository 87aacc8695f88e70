//! # API Module
//!
//! This module provides the HTTP handlers for the dashboard server. It
//! implements the OAuth entry points, the statistics proxy, the playback
//! endpoints, and a health check.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - Redirects to the provider's authorization endpoint with the
//!   fixed scope list.
//! - [`callback`] - Completes the authorization-code flow: exchanges the
//!   code for a token pair, installs the session, sets the session cookie
//!   and redirects to the dashboard.
//! - [`logout`] - Clears the session and the cookie.
//!
//! ### Statistics
//!
//! - [`dashboard`] - Aggregate of profile, top items, listening history and
//!   playlists fetched concurrently.
//! - [`profile`], [`top_tracks`], [`top_artists`], [`recently_played`],
//!   [`playlists`] - Individual JSON proxies, each guarded by the session
//!   refresh guard.
//!
//! ### Playback
//!
//! - [`player_state`] - Point-in-time playback snapshot.
//! - [`player_control`] - Command proxy with device pre-check.
//! - [`player_stream`] - Server-sent events fed by the playback monitor.
//!
//! ### Monitoring
//!
//! - [`health`] - Application status and version for monitoring systems.
//!
//! ## Architecture
//!
//! The handlers are built on the [Axum](https://docs.rs/axum) web framework.
//! The session is shared through an `Extension` layer; every protected
//! handler goes through [`SessionManager`](crate::management::SessionManager)
//! rather than touching credentials directly.
//!
//! ## Related Modules
//!
//! - [`crate::spotify`] - Spotify API integration
//! - [`crate::management`] - Session credentials and the playback monitor
//! - [`crate::types`] - Type definitions for provider payloads

mod auth;
mod health;
mod pages;
mod player;
mod stats;

pub use auth::callback;
pub use auth::login;
pub use auth::logout;
pub use health::health;
pub use pages::auth_error;
pub use pages::index;
pub use player::player_control;
pub use player::player_state;
pub use player::player_stream;
pub use stats::dashboard;
pub use stats::playlists;
pub use stats::profile;
pub use stats::recently_played;
pub use stats::top_artists;
pub use stats::top_tracks;
