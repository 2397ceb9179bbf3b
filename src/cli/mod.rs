//! # CLI Module
//!
//! Command implementations behind the `albumhue` binary.
//!
//! - [`serve`] - runs the web service
//! - [`extract`] - prints the palette of a local file or image URL
//!
//! Both commands report through the crate's logging macros. `extract`
//! follows the same contract as the web service: artwork that can't be
//! fetched or decoded prints the fallback palette instead of failing.
//!
//! ## Usage
//!
//! ```bash
//! albumhue serve --open
//! albumhue extract cover.jpg --count 8
//! albumhue extract https://i.scdn.co/image/ab67616d0000b273... --quality 1
//! ```

mod extract;
mod serve;

pub use extract::extract;
pub use serve::serve;
