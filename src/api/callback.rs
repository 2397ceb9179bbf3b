use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
};

use crate::{api::credential, server::AppState, spotify, success, warning};

/// OAuth redirect target.
///
/// Anything other than a clean code exchange for the session's own pending
/// login sends the user to `/limited`.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Redirect {
    if let Some(error) = params.get("error") {
        warning!("Spotify authorization was denied: {}", error);
        return Redirect::to("/limited");
    }

    let Some(code) = params.get("code") else {
        warning!("Callback without authorization code.");
        return Redirect::to("/limited");
    };

    let Some(session_id) = credential::session_id(&headers) else {
        warning!("Callback without a session cookie.");
        return Redirect::to("/limited");
    };

    let Some(flow) = state.sessions.take_auth(&session_id).await else {
        warning!("Callback without a pending login.");
        return Redirect::to("/limited");
    };

    if params.get("state") != Some(&flow.state) {
        warning!("OAuth state mismatch, ignoring callback.");
        return Redirect::to("/limited");
    }

    match spotify::auth::exchange_code(&state.http, &state.config, code, &flow.code_verifier).await
    {
        Ok(token) => {
            state.sessions.store_token(&session_id, token).await;
            success!("User authenticated.");
            Redirect::to("/app")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Redirect::to("/limited")
        }
    }
}
