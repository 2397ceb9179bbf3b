//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API that albumhue needs: the
//! OAuth token endpoint and three catalog lookups. Every call is a single
//! round-trip with a status check; there is no retry or backoff.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers (api)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization code + PKCE, client credentials, refresh)
//!     └── Albums (search, album details, currently playing)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Credentials
//!
//! No function here reads session or global state. The access token is
//! always passed in explicitly by the caller, and endpoint URLs come from a
//! [`SpotifyConfig`](crate::config::SpotifyConfig) value.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - code exchange, refresh, client credentials
//! - `GET /search?type=album&limit=1`
//! - `GET /albums/{id}`
//! - `GET /me/player/currently-playing`

pub mod albums;
pub mod auth;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Network failure or unreadable response body.
    #[error("request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Spotify answered with a non-success status.
    #[error("Spotify responded with status {0}")]
    Status(StatusCode),

    /// Token endpoint answered without a usable token.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl SpotifyError {
    /// Upstream status when Spotify answered, `None` for transport failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SpotifyError::Status(status) => Some(*status),
            SpotifyError::Http(e) => e.status(),
            SpotifyError::Auth(_) => None,
        }
    }
}
