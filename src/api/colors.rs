use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    api::{ApiError, credential},
    palette,
    server::AppState,
    spotify::{self, albums},
    types::{AlbumColors, AlbumDetails, AlbumPayload, TrackColors, TrackPayload},
    utils,
};

fn search_query(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    params
        .get("q")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "No search query provided"))
}

/// `GET /search?q=` for logged-in users.
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AlbumColors>, ApiError> {
    let token = credential::access_token(&state, &headers)
        .await
        .ok_or_else(ApiError::unauthorized)?;
    let query = search_query(&params)?;

    album_colors_for_query(&state, &token, query, "No album artwork available")
        .await
        .map(Json)
}

/// `GET /limited-search?q=`, no login required.
///
/// Uses an app-only token from the client credentials grant.
pub async fn limited_search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AlbumColors>, ApiError> {
    let query = search_query(&params)?;

    let token = spotify::auth::client_credentials_token(&state.http, &state.config)
        .await
        .map_err(|e| ApiError::upstream(&e, "Failed to authenticate with Spotify"))?;

    album_colors_for_query(&state, &token.access_token, query, "No artwork available")
        .await
        .map(Json)
}

/// `GET /current-track`: palette for whatever the user is playing.
pub async fn current_track(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TrackColors>, ApiError> {
    let token = credential::access_token(&state, &headers)
        .await
        .ok_or_else(ApiError::unauthorized)?;

    let playing = albums::currently_playing(&state.http, &state.config, &token)
        .await
        .map_err(|e| ApiError::upstream(&e, "Failed to get current track"))?
        .ok_or_else(|| ApiError::not_found("No track currently playing"))?;

    let Some(item) = playing.item else {
        return Err(ApiError::not_found("No track information available"));
    };
    let Some(album_ref) = item.album else {
        return Err(ApiError::not_found("No track information available"));
    };

    let album = fetch_album(&state, &token, &album_ref.id).await?;
    let (image_url, colors) = artwork_colors(&state, &album, "No album artwork available").await?;

    Ok(Json(TrackColors {
        track: TrackPayload {
            name: item.name,
            artist: utils::join_artist_names(&album.artists),
            album: album.name,
            release_date: album.release_date,
            image_url,
        },
        colors,
    }))
}

async fn album_colors_for_query(
    state: &AppState,
    token: &str,
    query: &str,
    no_artwork: &str,
) -> Result<AlbumColors, ApiError> {
    let album_id = albums::search_album(&state.http, &state.config, token, query)
        .await
        .map_err(|e| ApiError::upstream(&e, "Failed to search albums"))?
        .ok_or_else(|| ApiError::not_found("No albums found"))?;

    let album = fetch_album(state, token, &album_id).await?;
    let (image_url, colors) = artwork_colors(state, &album, no_artwork).await?;

    Ok(AlbumColors {
        album: AlbumPayload {
            artist: utils::join_artist_names(&album.artists),
            name: album.name,
            release_date: album.release_date,
            image_url,
        },
        colors,
    })
}

async fn fetch_album(state: &AppState, token: &str, album_id: &str) -> Result<AlbumDetails, ApiError> {
    albums::get_album(&state.http, &state.config, token, album_id)
        .await
        .map_err(|e| ApiError::upstream(&e, "Failed to get album details"))
}

async fn artwork_colors(
    state: &AppState,
    album: &AlbumDetails,
    no_artwork: &str,
) -> Result<(String, Vec<String>), ApiError> {
    let image = utils::select_largest_image(&album.images)
        .ok_or_else(|| ApiError::not_found(no_artwork))?;

    let colors =
        palette::extract_colors_from_url(&state.http, &image.url, state.color_count, state.quality)
            .await;

    Ok((image.url.clone(), colors))
}
