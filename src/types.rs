use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::palette::Rgb;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Pending login, kept in the session between `/auth` and `/callback`.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumArtist {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub albums: Option<AlbumPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumPage {
    #[serde(default)]
    pub items: Vec<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub item: Option<PlayingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayingItem {
    pub name: String,
    // absent for podcast episodes
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumPayload {
    pub name: String,
    pub artist: String,
    pub release_date: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackPayload {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub release_date: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumColors {
    pub album: AlbumPayload,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackColors {
    pub track: TrackPayload,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Tabled)]
pub struct PaletteTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub hex: String,
    pub rgb: String,
}

impl PaletteTableRow {
    /// One row per hex color, numbered from 1.
    pub fn from_colors(colors: &[String]) -> Vec<Self> {
        colors
            .iter()
            .enumerate()
            .map(|(i, hex)| PaletteTableRow {
                index: i + 1,
                hex: hex.clone(),
                rgb: Rgb::from_hex(hex)
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
