use crate::{
    config::{self, SpotifyConfig},
    error, info,
    server::{AppState, start_api_server},
    warning,
};

pub async fn serve(address: Option<String>, open: bool) {
    let spotify = SpotifyConfig::from_env();
    if !spotify.has_credentials() {
        error!(
            "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set (environment, credentials.env or the albumhue .env file)."
        );
    }

    let addr = address.unwrap_or_else(config::server_addr);
    info!("Spotify redirect URI: {}", spotify.redirect_uri);

    let server_addr = addr.clone();
    let server = tokio::spawn(async move {
        start_api_server(&server_addr, AppState::new(spotify)).await
    });

    if open {
        let url = format!("http://{}/", addr);
        if webbrowser::open(&url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            );
        }
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Server failed: {}", e),
        Err(e) => error!("Server task panicked: {}", e),
    }
}
