//! Configuration management for albumhue.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Spotify credentials, endpoint URLs and server settings
//! are all read here.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `credentials.env` in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SCOPE: &str = "user-read-currently-playing user-read-recently-played";

/// Loads environment variables from `.env` files.
///
/// Looks for `albumhue/.env` in the platform-specific local data directory
/// (creating the directory if needed) and then for `credentials.env` in the
/// working directory. `dotenv` never overrides variables that are already
/// set, so the process environment always wins. Missing files are skipped.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/albumhue/.env`
/// - macOS: `~/Library/Application Support/albumhue/.env`
/// - Windows: `%LOCALAPPDATA%/albumhue/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("albumhue/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    for candidate in [path, PathBuf::from("credentials.env")] {
        if candidate.is_file() {
            dotenv::from_path(&candidate)
                .map_err(|e| format!("{}: {}", candidate.display(), e))?;
        }
    }
    Ok(())
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the HTTP server binds to (`SERVER_ADDRESS`, default `127.0.0.1:5000`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify API client ID (`SPOTIFY_CLIENT_ID`), empty when unset.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_CLIENT_ID").unwrap_or_default()
}

/// Returns the Spotify API client secret (`SPOTIFY_CLIENT_SECRET`), empty when unset.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default()
}

/// Returns the OAuth redirect URI (`REDIRECT_URI`).
///
/// This must match the redirect URI registered in the Spotify application settings.
pub fn spotify_redirect_uri() -> String {
    var_or("REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Snapshot of the Spotify settings, carried by the server state.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl SpotifyConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: spotify_client_id(),
            client_secret: spotify_client_secret(),
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}
