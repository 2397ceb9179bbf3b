use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{api::credential, server::AppState};

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const APP_HTML: &str = include_str!("../../templates/app.html");
const LIMITED_HTML: &str = include_str!("../../templates/limited.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn limited() -> Html<&'static str> {
    Html(LIMITED_HTML)
}

/// Full app page. Requires a logged-in session, otherwise starts the login.
pub async fn app_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let logged_in = match credential::session_id(&headers) {
        Some(id) => state.sessions.token(&id).await.is_some(),
        None => false,
    };

    if logged_in {
        Html(APP_HTML).into_response()
    } else {
        Redirect::to("/auth").into_response()
    }
}
