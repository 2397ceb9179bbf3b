use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tabled::Table;

use crate::{error, palette, types::PaletteTableRow, utils::is_url, warning};

pub async fn extract(source: String, color_count: usize, quality: u32) {
    let bytes = if is_url(&source) {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Fetching artwork...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        let fetched = palette::fetch_image_bytes(&Client::new(), &source).await;
        pb.finish_and_clear();

        // an empty buffer decodes to the fallback palette
        fetched.unwrap_or_else(|e| {
            warning!("{}", e);
            Vec::new()
        })
    } else {
        match async_fs::read(&source).await {
            Ok(bytes) => bytes,
            Err(e) => error!("Cannot read {}: {}", source, e),
        }
    };

    let colors = palette::extract_colors(&bytes, color_count, quality);
    println!("{}", Table::new(PaletteTableRow::from_colors(&colors)));
}
