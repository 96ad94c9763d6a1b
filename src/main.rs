mod config;
mod device;
mod guard;
mod provider;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::fallback::{FallbackStore, FileFallbackStore, MemoryFallbackStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration invalid");
            std::process::exit(1);
        }
    };

    // The provider client is built once here and shared by every handler.
    let provider = match provider::gotrue::GoTrueClient::new(&config.provider) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "auth provider client init failed");
            std::process::exit(1);
        }
    };

    let fallback: Arc<dyn FallbackStore> = match &config.fallback_dir {
        Some(dir) => match FileFallbackStore::open(dir.clone()).await {
            Ok(store) => {
                tracing::info!(dir = %dir.display(), "fallback identity store on disk");
                Arc::new(store)
            }
            Err(e) => {
                tracing::error!(error = %e, dir = %dir.display(), "fallback store init failed");
                std::process::exit(1);
            }
        },
        None => Arc::new(MemoryFallbackStore::new()),
    };

    let settings = state::Settings {
        site_url: config.site_url.clone(),
        cookie_secure: config.cookie_secure,
        guard: config.guard,
    };
    let state = state::AppState::new(provider, fallback, settings);

    let app = routes::app(state);
    let port = config.port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, site_url = %config.site_url, fail_open = config.guard.fail_open, "jobswipe listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
    }
}
