use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{config::SpotifyConfig, spotify::SpotifyError, types::Token};

/// Builds the Spotify authorization URL the browser is redirected to.
///
/// The request asks for an authorization code and carries the CSRF `state`
/// nonce plus the PKCE challenge derived from the session's code verifier.
/// `show_dialog` is always set so users can switch accounts.
///
/// # Errors
///
/// Fails with [`SpotifyError::Auth`] if the configured authorization URL is
/// not a valid URL.
pub fn authorize_url(
    cfg: &SpotifyConfig,
    state: &str,
    code_challenge: &str,
) -> Result<String, SpotifyError> {
    let url = Url::parse_with_params(
        &cfg.auth_url,
        &[
            ("client_id", cfg.client_id.as_str()),
            ("response_type", "code"),
            ("scope", cfg.scope.as_str()),
            ("redirect_uri", cfg.redirect_uri.as_str()),
            ("show_dialog", "true"),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| SpotifyError::Auth(format!("invalid authorization url: {}", e)))?;

    Ok(url.into())
}

/// Exchanges an authorization code for an access token.
///
/// Completes the authorization code flow started by [`authorize_url`]. The
/// client secret and the PKCE code verifier are both sent, so Spotify can
/// check that the same client that started the flow is finishing it.
///
/// # Errors
///
/// - [`SpotifyError::Http`] on network failures
/// - [`SpotifyError::Status`] if the token endpoint rejects the code
/// - [`SpotifyError::Auth`] if the response carries no access token
///
/// # Security Note
///
/// The authorization code is single-use and expires quickly (typically 10 minutes).
/// The exchange should happen immediately after receiving the code.
pub async fn exchange_code(
    client: &Client,
    cfg: &SpotifyConfig,
    code: &str,
    verifier: &str,
) -> Result<Token, SpotifyError> {
    let res = client
        .post(&cfg.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", cfg.redirect_uri.as_str()),
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("code_verifier", verifier),
        ])
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(SpotifyError::Status(res.status()));
    }

    let json: Value = res.json().await?;
    token_from_json(&json, None)
}

/// Refreshes an expired access token using a refresh token.
///
/// Spotify may or may not rotate the refresh token. When the response omits
/// it, the one that was passed in is kept.
///
/// # Errors
///
/// Same conditions as [`exchange_code`].
pub async fn refresh_token(
    client: &Client,
    cfg: &SpotifyConfig,
    refresh_token: &str,
) -> Result<Token, SpotifyError> {
    let res = client
        .post(&cfg.token_url)
        .basic_auth(&cfg.client_id, Some(&cfg.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(SpotifyError::Status(res.status()));
    }

    let json: Value = res.json().await?;
    token_from_json(&json, Some(refresh_token))
}

/// Obtains an app-only token with the client credentials grant.
///
/// Used for the limited search, where no user has logged in. The token can
/// read the public catalog but not user data.
///
/// # Errors
///
/// Same conditions as [`exchange_code`].
pub async fn client_credentials_token(
    client: &Client,
    cfg: &SpotifyConfig,
) -> Result<Token, SpotifyError> {
    let credentials = STANDARD.encode(format!("{}:{}", cfg.client_id, cfg.client_secret));

    let res = client
        .post(&cfg.token_url)
        .header("Authorization", format!("Basic {}", credentials))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(SpotifyError::Status(res.status()));
    }

    let json: Value = res.json().await?;
    token_from_json(&json, None)
}

/// Converts a token endpoint response into a [`Token`].
///
/// # Errors
///
/// Returns [`SpotifyError::Auth`] when `access_token` is missing or empty.
pub fn token_from_json(json: &Value, previous_refresh: Option<&str>) -> Result<Token, SpotifyError> {
    let access_token = json["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SpotifyError::Auth("no access token in response".to_string()))?;

    let refresh_token = json["refresh_token"]
        .as_str()
        .or(previous_refresh)
        .map(str::to_string);

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token,
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
