use reqwest::{Client, StatusCode};

use crate::{
    config::SpotifyConfig,
    spotify::SpotifyError,
    types::{AlbumDetails, CurrentlyPlaying, SearchResponse},
};

/// Searches the catalog and returns the id of the best matching album.
///
/// Only the first hit is requested (`limit=1`). `Ok(None)` means the search
/// succeeded but found nothing.
///
/// # Errors
///
/// [`SpotifyError::Status`] for non-200 answers, [`SpotifyError::Http`] for
/// network or JSON failures.
pub async fn search_album(
    client: &Client,
    cfg: &SpotifyConfig,
    token: &str,
    query: &str,
) -> Result<Option<String>, SpotifyError> {
    let res = client
        .get(format!("{}/search", cfg.api_url))
        .query(&[("q", query), ("type", "album"), ("limit", "1")])
        .bearer_auth(token)
        .send()
        .await?;

    if res.status() != StatusCode::OK {
        return Err(SpotifyError::Status(res.status()));
    }

    let body = res.json::<SearchResponse>().await?;
    Ok(body
        .albums
        .and_then(|page| page.items.into_iter().next())
        .map(|album| album.id))
}

/// Fetches full album details, including artists and artwork.
///
/// # Errors
///
/// Same as [`search_album`].
pub async fn get_album(
    client: &Client,
    cfg: &SpotifyConfig,
    token: &str,
    album_id: &str,
) -> Result<AlbumDetails, SpotifyError> {
    let res = client
        .get(format!("{}/albums/{}", cfg.api_url, album_id))
        .bearer_auth(token)
        .send()
        .await?;

    if res.status() != StatusCode::OK {
        return Err(SpotifyError::Status(res.status()));
    }

    Ok(res.json::<AlbumDetails>().await?)
}

/// Looks up what the user is playing right now.
///
/// Spotify answers `204 No Content` when nothing is playing; that is
/// reported as `Ok(None)`.
///
/// # Errors
///
/// Same as [`search_album`].
pub async fn currently_playing(
    client: &Client,
    cfg: &SpotifyConfig,
    token: &str,
) -> Result<Option<CurrentlyPlaying>, SpotifyError> {
    let res = client
        .get(format!("{}/me/player/currently-playing", cfg.api_url))
        .bearer_auth(token)
        .send()
        .await?;

    match res.status() {
        StatusCode::NO_CONTENT => Ok(None),
        StatusCode::OK => Ok(Some(res.json::<CurrentlyPlaying>().await?)),
        status => Err(SpotifyError::Status(status)),
    }
}
