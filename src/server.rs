use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Instant};

use axum::{
    Router,
    extract::Request,
    http::{
        HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::Client;

use crate::{
    Res, api,
    config::SpotifyConfig,
    info,
    management::SessionStore,
    palette::{DEFAULT_COLOR_COUNT, DEFAULT_QUALITY},
    success,
};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<SpotifyConfig>,
    pub sessions: SessionStore,
    pub http: Client,
    pub color_count: usize,
    pub quality: u32,
}

impl AppState {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: SessionStore::new(),
            http: Client::new(),
            color_count: DEFAULT_COLOR_COUNT,
            quality: DEFAULT_QUALITY,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/auth", get(api::auth))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/limited", get(api::limited))
        .route("/app", get(api::app_page))
        .route("/search", get(api::search))
        .route("/limited-search", get(api::limited_search))
        .route("/current-track", get(api::current_track))
        .route("/health", get(api::health))
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Allows any origin. Preflight requests are answered here.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    res
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let res = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        res.status().as_u16(),
        start.elapsed().as_millis()
    );
    res
}

/// Binds `addr` and serves until the process is stopped.
///
/// # Errors
///
/// Fails if the address can't be parsed or bound, or the server stops with an I/O error.
pub async fn start_api_server(addr: &str, state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    success!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
