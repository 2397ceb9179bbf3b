mod auth;
mod session;

pub use auth::TokenManager;
pub use session::SESSION_COOKIE;
pub use session::SessionStore;
