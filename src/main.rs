use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_dashboard::config::AppConfig;
use crypto_dashboard::jobs::dashboard_refresh::start_dashboard_refresh_job;
use crypto_dashboard::services::cache::SystemClock;
use crypto_dashboard::services::coingecko::CoinGeckoService;
use crypto_dashboard::services::dashboard::DashboardService;
use crypto_dashboard::services::transport::HttpTransport;
use crypto_dashboard::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crypto_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!(
        "Tracking {:?} in {} over {} days (cache TTL {}s)",
        config.defaults.coins,
        config.defaults.currency,
        config.defaults.days,
        config.cache_ttl_secs
    );

    let transport = HttpTransport::new(
        config.coingecko_base_url.clone(),
        config.coingecko_api_key.clone(),
        config.http_timeout(),
    )?;

    let coingecko = CoinGeckoService::new(
        Arc::new(transport),
        config.cache_settings(),
        Arc::new(SystemClock),
    );

    let dashboard = DashboardService::new(coingecko, config.defaults.clone());

    start_dashboard_refresh_job(dashboard.clone(), config.refresh_interval_secs).await;

    let state = AppState {
        dashboard,
        refresh_interval_secs: config.refresh_interval_secs,
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
