use std::{collections::HashMap, io::Cursor, time::Duration};

use albumhue::{
    config::SpotifyConfig,
    management::{SESSION_COOKIE, SessionStore},
    server::{AppState, router},
    types::Token,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query},
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::{
    Client, Method, Url,
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, COOKIE, LOCATION, SET_COOKIE},
    redirect::Policy,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

// Helper function to serve a router on an ephemeral port
async fn spawn(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(32, 32, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

async fn fake_token(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    if form.get("grant_type").map(String::as_str) == Some("refresh_token") {
        return Json(json!({"access_token": "refreshed-token", "expires_in": 3600}));
    }

    Json(json!({
        "access_token": "user-token",
        "token_type": "Bearer",
        "scope": "user-read-currently-playing",
        "expires_in": 3600,
        "refresh_token": "refresh"
    }))
}

async fn fake_search(Query(params): Query<HashMap<String, String>>) -> Response {
    let items = match params.get("q").map(String::as_str) {
        Some("throttled") => return StatusCode::TOO_MANY_REQUESTS.into_response(),
        Some("nothing") => json!([]),
        Some("bare") => json!([{"id": "bare"}]),
        Some("broken") => json!([{"id": "broken"}]),
        _ => json!([{"id": "abbey"}]),
    };
    Json(json!({"albums": {"items": items}})).into_response()
}

fn fake_album(base: &str, id: &str) -> Response {
    if id == "broken" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let images = if id == "bare" {
        json!([])
    } else {
        json!([
            {"url": format!("{base}/missing.png"), "width": 64, "height": 64},
            {"url": format!("{base}/cover.png"), "width": 640, "height": 640},
            {"url": format!("{base}/missing.png"), "width": 300, "height": 300}
        ])
    };

    Json(json!({
        "id": id,
        "name": "Abbey Road",
        "release_date": "1969-09-26",
        "artists": [
            {"id": "3WrFJ7ztbogyGnTHbHJFl2", "name": "The Beatles"},
            {"id": "0", "name": "George Martin"}
        ],
        "images": images
    }))
    .into_response()
}

async fn fake_currently_playing(headers: HeaderMap) -> Response {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match auth {
        "Bearer idle" => StatusCode::NO_CONTENT.into_response(),
        "Bearer stale" => StatusCode::UNAUTHORIZED.into_response(),
        "Bearer failing" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "Bearer podcast" => Json(json!({"item": {"name": "Episode 1"}})).into_response(),
        _ => Json(json!({
            "item": {"name": "Come Together", "album": {"id": "abbey"}}
        }))
        .into_response(),
    }
}

/// Minimal stand-in for the Spotify accounts and Web API hosts.
async fn fake_spotify() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let album_base = base.clone();
    let cover = solid_png([18, 52, 86]);

    let app = Router::new()
        .route("/api/token", post(fake_token))
        .route("/v1/search", get(fake_search))
        .route(
            "/v1/albums/{id}",
            get(move |Path(id): Path<String>| {
                let base = album_base.clone();
                async move { fake_album(&base, &id) }
            }),
        )
        .route("/v1/me/player/currently-playing", get(fake_currently_playing))
        .route(
            "/cover.png",
            get(move || {
                let cover = cover.clone();
                async move { ([(CONTENT_TYPE, "image/png")], cover) }
            }),
        );

    spawn(listener, app).await;
    base
}

fn config_for(spotify: &str) -> SpotifyConfig {
    SpotifyConfig {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:5000/callback".to_string(),
        scope: "user-read-currently-playing".to_string(),
        auth_url: format!("{spotify}/authorize"),
        token_url: format!("{spotify}/api/token"),
        api_url: format!("{spotify}/v1"),
    }
}

async fn start(config: SpotifyConfig) -> (String, AppState) {
    start_with(AppState::new(config)).await
}

async fn start_with(state: AppState) -> (String, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    spawn(listener, router(state.clone())).await;
    (base, state)
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

// Puts a fresh token into a new session and returns the cookie header value
async fn login(state: &AppState, access_token: &str) -> String {
    let (_, cookie) = login_with(
        state,
        Token {
            access_token: access_token.to_string(),
            refresh_token: None,
            scope: String::new(),
            expires_in: 3600,
            obtained_at: chrono::Utc::now().timestamp() as u64,
        },
    )
    .await;
    cookie
}

async fn login_with(state: &AppState, token: Token) -> (String, String) {
    let id = state.sessions.create().await;
    state.sessions.store_token(&id, token).await;
    let cookie = format!("{SESSION_COOKIE}={id}");
    (id, cookie)
}

async fn get_json(res: reqwest::Response) -> (StatusCode, Value) {
    let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
    (status, res.json().await.unwrap())
}

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_health_reports_ok_with_cors() {
    let (base, _) = start(SpotifyConfig::default()).await;
    let res = client().get(format!("{base}/health")).send().await.unwrap();

    assert_eq!(
        res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "albumhue");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn test_preflight_is_answered() {
    let (base, _) = start(SpotifyConfig::default()).await;
    let res = client()
        .request(Method::OPTIONS, format!("{base}/search"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 204);
    assert_eq!(
        res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_index_page_links_to_login() {
    let (base, _) = start(SpotifyConfig::default()).await;
    let body = client()
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("href=\"/auth\""));
}

#[tokio::test]
async fn test_endpoints_require_login() {
    let (base, _) = start(SpotifyConfig::default()).await;

    for path in ["/search?q=abbey", "/current-track"] {
        let res = client().get(format!("{base}{path}")).send().await.unwrap();
        let (status, body) = get_json(res).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(body, json!({"error": "Not authenticated"}));
    }

    let res = client().get(format!("{base}/app")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 303);
    assert_eq!(location(&res), "/auth");
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let (base, state) = start(SpotifyConfig::default()).await;
    let cookie = login(&state, "user-token").await;

    for path in ["/limited-search", "/limited-search?q=", "/limited-search?q=%20%20"] {
        let res = client().get(format!("{base}{path}")).send().await.unwrap();
        let (status, body) = get_json(res).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No search query provided");
    }

    let res = client()
        .get(format!("{base}/search?q="))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No search query provided");
}

#[tokio::test]
async fn test_login_flow() {
    let spotify = fake_spotify().await;
    let (base, _) = start(config_for(&spotify)).await;
    let client = client();

    let res = client.get(format!("{base}/auth")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 303);

    let cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

    let auth_url = Url::parse(&location(&res)).unwrap();
    assert!(auth_url.as_str().starts_with(&format!("{spotify}/authorize?")));
    let params: HashMap<String, String> = auth_url.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "client");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["code_challenge_method"], "S256");
    let nonce = params["state"].clone();

    let res = client
        .get(format!("{base}/callback?code=abc&state={nonce}"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/app");

    let res = client
        .get(format!("{base}/app"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    // logging out forgets the token
    client
        .get(format!("{base}/logout"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let res = client
        .get(format!("{base}/app"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/auth");
}

#[tokio::test]
async fn test_rejected_callbacks_go_to_limited() {
    let spotify = fake_spotify().await;
    let (base, _) = start(config_for(&spotify)).await;
    let client = client();

    let res = client
        .get(format!("{base}/callback?error=access_denied"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/limited");

    let res = client.get(format!("{base}/auth")).send().await.unwrap();
    let cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string();
    let auth_url = Url::parse(&location(&res)).unwrap();
    let nonce = auth_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let res = client
        .get(format!("{base}/callback?code=abc&state=forged"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/limited");

    // the pending login was consumed by the forged attempt
    let res = client
        .get(format!("{base}/callback?code=abc&state={nonce}"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/limited");

    // no session cookie at all
    let res = client
        .get(format!("{base}/callback?code=abc&state={nonce}"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&res), "/limited");
}

#[tokio::test]
async fn test_limited_search_returns_palette() {
    let spotify = fake_spotify().await;
    let (base, _) = start(config_for(&spotify)).await;

    let res = client()
        .get(format!("{base}/limited-search?q=abbey%20road"))
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "album": {
                "name": "Abbey Road",
                "artist": "The Beatles, George Martin",
                "release_date": "1969-09-26",
                "image_url": format!("{spotify}/cover.png")
            },
            "colors": ["#123456", "#123456", "#123456", "#123456", "#123456"]
        })
    );
}

#[tokio::test]
async fn test_search_not_found_cases() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;
    let cookie = login(&state, "user-token").await;

    let cases = [
        ("/limited-search?q=nothing", "No albums found"),
        ("/limited-search?q=bare", "No artwork available"),
        ("/search?q=nothing", "No albums found"),
        ("/search?q=bare", "No album artwork available"),
    ];

    for (path, message) in cases {
        let res = client()
            .get(format!("{base}{path}"))
            .header(COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        let (status, body) = get_json(res).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body["error"], message, "{}", path);
    }
}

#[tokio::test]
async fn test_search_with_session_returns_palette() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;
    let cookie = login(&state, "user-token").await;

    let res = client()
        .get(format!("{base}/search?q=abbey"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["album"]["artist"], "The Beatles, George Martin");
    assert_eq!(body["colors"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_current_track() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;

    let cookie = login(&state, "user-token").await;
    let res = client()
        .get(format!("{base}/current-track"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["track"],
        json!({
            "name": "Come Together",
            "artist": "The Beatles, George Martin",
            "album": "Abbey Road",
            "release_date": "1969-09-26",
            "image_url": format!("{spotify}/cover.png")
        })
    );
    assert_eq!(body["colors"][0], "#123456");

    let cases = [
        ("idle", "No track currently playing"),
        ("podcast", "No track information available"),
    ];
    for (token, message) in cases {
        let cookie = login(&state, token).await;
        let res = client()
            .get(format!("{base}/current-track"))
            .header(COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        let (status, body) = get_json(res).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", token);
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn test_unreachable_spotify_is_bad_gateway() {
    // nothing listens on the discard port
    let (base, state) = start(config_for("http://127.0.0.1:9")).await;
    let cookie = login(&state, "user-token").await;

    let res = client()
        .get(format!("{base}/search?q=abbey"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to search albums");

    let res = client()
        .get(format!("{base}/limited-search?q=abbey"))
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to authenticate with Spotify");
}

#[tokio::test]
async fn test_upstream_status_is_forwarded() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;
    let cookie = login(&state, "user-token").await;

    let cases = [
        ("/search?q=throttled", "user-token", StatusCode::TOO_MANY_REQUESTS, "Failed to search albums"),
        ("/limited-search?q=throttled", "user-token", StatusCode::TOO_MANY_REQUESTS, "Failed to search albums"),
        ("/search?q=broken", "user-token", StatusCode::INTERNAL_SERVER_ERROR, "Failed to get album details"),
        ("/limited-search?q=broken", "user-token", StatusCode::INTERNAL_SERVER_ERROR, "Failed to get album details"),
        ("/current-track", "failing", StatusCode::SERVICE_UNAVAILABLE, "Failed to get current track"),
    ];

    for (path, token, expected, message) in cases {
        let cookie = if token == "user-token" {
            cookie.clone()
        } else {
            login(&state, token).await
        };
        let res = client()
            .get(format!("{base}{path}"))
            .header(COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        let (status, body) = get_json(res).await;
        assert_eq!(status, expected, "{}", path);
        assert_eq!(body, json!({"error": message}), "{}", path);
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_use() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;

    // Spotify rejects "stale", so a 200 proves the refreshed token was sent
    let (id, cookie) = login_with(
        &state,
        Token {
            access_token: "stale".to_string(),
            refresh_token: Some("refresh".to_string()),
            scope: String::new(),
            expires_in: 3600,
            obtained_at: chrono::Utc::now().timestamp() as u64 - 7200,
        },
    )
    .await;

    let res = client()
        .get(format!("{base}/current-track"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["track"]["name"], "Come Together");

    let stored = state.sessions.token(&id).await.unwrap();
    assert_eq!(stored.access_token, "refreshed-token");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
}

#[tokio::test]
async fn test_expired_token_without_refresh_is_rejected_upstream() {
    let spotify = fake_spotify().await;
    let (base, state) = start(config_for(&spotify)).await;
    let (_, cookie) = login_with(
        &state,
        Token {
            access_token: "stale".to_string(),
            refresh_token: None,
            scope: String::new(),
            expires_in: 3600,
            obtained_at: chrono::Utc::now().timestamp() as u64 - 7200,
        },
    )
    .await;

    let res = client()
        .get(format!("{base}/current-track"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    let (status, body) = get_json(res).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Failed to get current track");
}

#[tokio::test]
async fn test_anonymous_logins_do_not_grow_sessions() {
    let mut state = AppState::new(SpotifyConfig::default());
    state.sessions = SessionStore::with_limits(8, Duration::from_secs(600));
    let (base, state) = start_with(state).await;
    let client = client();

    for _ in 0..50 {
        let res = client.get(format!("{base}/auth")).send().await.unwrap();
        assert_eq!(res.status().as_u16(), 303);
        assert!(res.headers().get(SET_COOKIE).is_some());
    }

    assert_eq!(state.sessions.len().await, 8);

    let (_, body) = get_json(client.get(format!("{base}/health")).send().await.unwrap()).await;
    assert_eq!(body["sessions"], 8);
}
