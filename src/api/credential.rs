use axum::http::HeaderMap;

use crate::{
    management::{SESSION_COOKIE, TokenManager},
    server::AppState,
    utils,
};

pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    utils::get_cookie(headers, SESSION_COOKIE)
}

pub(crate) fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Resolves the request's session to a usable access token.
///
/// Expired tokens are refreshed and written back to the session.
pub(crate) async fn access_token(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let id = session_id(headers)?;
    let token = state.sessions.token(&id).await?;

    let mut manager = TokenManager::new(token);
    let access = manager.get_valid_token(&state.http, &state.config).await;
    state.sessions.store_token(&id, manager.into_token()).await;

    Some(access)
}
