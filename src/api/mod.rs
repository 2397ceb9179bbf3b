//! # API Module
//!
//! HTTP endpoints of the albumhue web service.
//!
//! ## Endpoints
//!
//! ### Pages
//!
//! - [`index`] - landing page with the login button
//! - [`limited`] - search-only page for users who declined the login
//! - [`app_page`] - full app; redirects to `/auth` without a session token
//!
//! ### Authentication
//!
//! - [`auth`] - starts the Spotify authorization code flow (with PKCE)
//! - [`callback`] - exchanges the authorization code and stores the token
//! - [`logout`] - forgets the session
//!
//! ### Palettes
//!
//! - [`search`] - album search with the user's token
//! - [`limited_search`] - album search with an app-only token
//! - [`current_track`] - currently playing track
//!
//! ### Monitoring
//!
//! - [`health`] - status and version
//!
//! ## Errors
//!
//! Failures are reported as `{"error": "<message>"}` with a non-2xx status,
//! see [`ApiError`]. Palette extraction itself never fails: unreadable
//! artwork yields the fallback palette.
//!
//! ## Credentials
//!
//! The browser only holds an opaque session cookie. Handlers resolve it to
//! an access token once per request and pass that token explicitly to
//! [`crate::spotify`].

mod callback;
mod colors;
mod credential;
mod error;
mod health;
mod oauth;
mod pages;

pub use callback::callback;
pub use colors::current_track;
pub use colors::limited_search;
pub use colors::search;
pub use error::ApiError;
pub use health::health;
pub use oauth::auth;
pub use oauth::logout;
pub use pages::app_page;
pub use pages::index;
pub use pages::limited;
