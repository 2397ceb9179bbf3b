use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{spotify::SpotifyError, types::ErrorBody, warning};

/// User-visible failure, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Forwards Spotify's status code; transport failures become 502.
    pub fn upstream(err: &SpotifyError, message: impl Into<String>) -> Self {
        let message = message.into();
        warning!("{}: {}", message, err);
        let status = err
            .status()
            .filter(|s| !s.is_success())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
