use axum::http::{HeaderMap, header::COOKIE};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{AlbumArtist, SpotifyImage};

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque OAuth `state` nonce.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

pub fn generate_session_id() -> String {
    random_alphanumeric(32)
}

pub fn image_width(image: &SpotifyImage) -> u32 {
    image.width.unwrap_or(0)
}

/// Picks the widest image. A missing width counts as 0; the first entry wins ties.
pub fn select_largest_image(images: &[SpotifyImage]) -> Option<&SpotifyImage> {
    images.iter().fold(None, |best, image| match best {
        Some(b) if image_width(b) >= image_width(image) => Some(b),
        _ => Some(image),
    })
}

/// Joins artist names with `", "`, keeping their order.
pub fn join_artist_names(artists: &[AlbumArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// True for `http://` and `https://` sources.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
