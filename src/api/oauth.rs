use axum::{
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    api::{ApiError, credential},
    server::AppState,
    spotify,
    types::AuthFlow,
    utils,
};

/// Starts the login: stores a PKCE verifier and state nonce in the session
/// and redirects to Spotify.
pub async fn auth(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let existing = match credential::session_id(&headers) {
        Some(id) => state.sessions.exists(&id).await.then_some(id),
        None => None,
    };
    let is_new = existing.is_none();
    let session_id = match existing {
        Some(id) => id,
        None => state.sessions.create().await,
    };

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let nonce = utils::generate_state();

    let auth_url = match spotify::auth::authorize_url(&state.config, &nonce, &code_challenge) {
        Ok(url) => url,
        Err(e) => {
            return ApiError::upstream(&e, "Failed to start authentication")
                .into_response();
        }
    };

    state
        .sessions
        .begin_auth(
            &session_id,
            AuthFlow {
                state: nonce,
                code_verifier,
            },
        )
        .await;

    let redirect = Redirect::to(&auth_url);
    if is_new {
        ([(SET_COOKIE, credential::session_cookie(&session_id))], redirect).into_response()
    } else {
        redirect.into_response()
    }
}

/// Drops the session, and with it the user's token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = credential::session_id(&headers) {
        state.sessions.remove(&id).await;
    }
    Redirect::to("/")
}
