//! # Palette Module
//!
//! Turns album artwork into a short list of dominant colors.
//!
//! The public entry points never fail: [`extract_colors`] and
//! [`extract_colors_from_url`] return [`FALLBACK_PALETTE`] whenever the image
//! cannot be fetched, decoded or clustered, and log the cause with
//! [`warning!`](crate::warning). Callers that want to see the failure use
//! [`try_extract_palette`] instead.
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> decode (image) -> sample every `quality`th pixel -> median cut -> #rrggbb
//! ```
//!
//! ## Fallback size
//!
//! The fallback palette always holds five colors, even when a different
//! `color_count` was requested. Browser clients rely on receiving that exact
//! list for unreadable artwork.

mod hex;
mod quantize;

use reqwest::{Client, StatusCode};
use thiserror::Error;

pub use hex::Rgb;

use crate::warning;

/// Number of colors returned when the caller doesn't ask for a specific count.
pub const DEFAULT_COLOR_COUNT: usize = 5;

/// Default sampling stride: every 10th pixel is considered.
pub const DEFAULT_QUALITY: u32 = 10;

/// Returned verbatim whenever extraction fails.
pub const FALLBACK_PALETTE: [&str; 5] = ["#4FB3BF", "#CD904D", "#1F1A3F", "#A0B5BE", "#8B4513"];

#[derive(Debug, Error)]
pub enum PaletteError {
    /// The image bytes could not be retrieved.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// The bytes are not a readable raster image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Sampling left nothing to cluster, or the request was degenerate.
    #[error("failed to cluster colors: {0}")]
    Clustering(String),
}

/// The fallback palette as owned strings.
pub fn fallback_palette() -> Vec<String> {
    FALLBACK_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Extracts `color_count` dominant colors from encoded image bytes.
///
/// Only every `quality`th pixel (row-major) is sampled; a `quality` of 0 is
/// treated as 1. On success the result has exactly `color_count` entries,
/// each formatted as `#rrggbb`. On any failure the five-color
/// [`FALLBACK_PALETTE`] is returned instead.
pub fn extract_colors(image_bytes: &[u8], color_count: usize, quality: u32) -> Vec<String> {
    match try_extract_palette(image_bytes, color_count, quality) {
        Ok(palette) => palette.iter().map(Rgb::to_hex).collect(),
        Err(e) => {
            warning!("Error extracting colors: {}", e);
            fallback_palette()
        }
    }
}

/// Fallible core of [`extract_colors`].
///
/// # Errors
///
/// Returns [`PaletteError::Decode`] when the bytes are not an image and
/// [`PaletteError::Clustering`] when no palette can be built from the samples.
pub fn try_extract_palette(
    image_bytes: &[u8],
    color_count: usize,
    quality: u32,
) -> Result<Vec<Rgb>, PaletteError> {
    let samples = {
        let img = image::load_from_memory(image_bytes)?;
        sample_pixels(&img.to_rgb8(), quality)
    };

    quantize::median_cut(samples, color_count)
}

fn sample_pixels(img: &image::RgbImage, quality: u32) -> Vec<Rgb> {
    let stride = quality.max(1) as usize;
    img.pixels().step_by(stride).map(|p| Rgb::from(*p)).collect()
}

/// Downloads the bytes behind `url`.
///
/// # Errors
///
/// Network failures and non-200 responses become [`PaletteError::Fetch`].
pub async fn fetch_image_bytes(client: &Client, url: &str) -> Result<Vec<u8>, PaletteError> {
    let res = client
        .get(url)
        .send()
        .await
        .map_err(|e| PaletteError::Fetch(e.to_string()))?;

    if res.status() != StatusCode::OK {
        return Err(PaletteError::Fetch(format!(
            "unexpected status {} for {}",
            res.status(),
            url
        )));
    }

    let bytes = res
        .bytes()
        .await
        .map_err(|e| PaletteError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Fetches the artwork at `url` and extracts its palette.
///
/// Fetch failures are handled like undecodable images: the fallback palette
/// is returned. Decoding and clustering run on the blocking thread pool.
pub async fn extract_colors_from_url(
    client: &Client,
    url: &str,
    color_count: usize,
    quality: u32,
) -> Vec<String> {
    let bytes = match fetch_image_bytes(client, url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warning!("Error extracting colors: {}", e);
            return fallback_palette();
        }
    };

    tokio::task::spawn_blocking(move || extract_colors(&bytes, color_count, quality))
        .await
        .unwrap_or_else(|e| {
            warning!("Color extraction task failed: {}", e);
            fallback_palette()
        })
}
