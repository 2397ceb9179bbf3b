//! albumhue library
//!
//! Extracts dominant color palettes from Spotify album artwork. The palette
//! extractor lives in [`palette`]; the rest of the crate is the small web
//! service around it that logs users in with Spotify, looks up albums or the
//! currently playing track and returns their artwork colors as JSON.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the web service
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Sessions and token lifetime
//! - `palette` - Image decoding and median-cut color extraction
//! - `server` - Router, middleware and server startup
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! let bytes = std::fs::read("cover.jpg").unwrap_or_default();
//! let colors = albumhue::palette::extract_colors(&bytes, 5, 10);
//! assert!(!colors.is_empty());
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod palette;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the outer edges (server startup, CLI commands) where errors are
/// only reported, never matched on. Module-level code returns typed errors.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("GET /search -> 200 ({} ms)", elapsed);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark to stderr and exits
/// the program with status 1.
///
/// Only for fatal startup problems such as missing credentials or an
/// address that can't be bound. Request handlers never use it.
///
/// # Example
///
/// ```
/// error!("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark to stderr.
///
/// Used for recoverable problems: failed upstream calls, rejected callbacks,
/// and artwork that fell back to the default palette.
///
/// # Example
///
/// ```
/// warning!("Error extracting colors: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
