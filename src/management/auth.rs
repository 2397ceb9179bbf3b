use chrono::Utc;
use reqwest::Client;

use crate::{config::SpotifyConfig, spotify, types::Token, warning};

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Wraps a user token and refreshes it when it is about to expire.
#[derive(Debug, Clone)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// Returns a usable access token, refreshing first if needed.
    ///
    /// If the refresh fails the old access token is returned anyway, and
    /// Spotify will answer with 401 for it.
    pub async fn get_valid_token(&mut self, client: &Client, cfg: &SpotifyConfig) -> String {
        if self.is_expired() {
            if let Some(refresh) = self.token.refresh_token.clone() {
                match spotify::auth::refresh_token(client, cfg, &refresh).await {
                    Ok(new_token) => self.token = new_token,
                    Err(e) => warning!("Failed to refresh token: {}", e),
                }
            }
        }

        self.token.access_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        let expires_at = self.token.obtained_at.saturating_add(self.token.expires_in);
        now.saturating_add(EXPIRY_MARGIN_SECS) >= expires_at
    }

    pub fn into_token(self) -> Token {
        self.token
    }
}
