use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use barberdesk::config::AppConfig;
use barberdesk::errors::AppError;
use barberdesk::handlers;
use barberdesk::services::backend::http::HttpBookingApi;
use barberdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is not set, using the default token");
    }

    let api = HttpBookingApi::new(
        config.booking_api_url.clone(),
        config.barbershop_id.clone(),
        config.booking_api_token.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    tracing::info!(
        "using booking API at {} (barbershop: {})",
        config.booking_api_url,
        config.barbershop_id
    );

    let cors = if config.cors_origin.is_empty() {
        CorsLayer::permissive()
    } else {
        let origin: HeaderValue = config
            .cors_origin
            .parse()
            .map_err(|_| {
                AppError::Config(format!("CORS_ORIGIN is not a valid origin: {}", config.cors_origin))
            })?;
        CorsLayer::permissive().allow_origin(origin)
    };

    let state = Arc::new(AppState::new(config.clone(), Box::new(api)));

    let app = handlers::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
