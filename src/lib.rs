// src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::dashboard::DashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub refresh_interval_secs: u64,
}

pub mod config;
pub mod error;

pub mod services {
    pub mod cache;
    pub mod coingecko;
    pub mod dashboard;
    pub mod summary;
    pub mod transport;
}

pub mod models {
    pub mod dashboard;
    pub mod history;
    pub mod price;
    pub mod selection;
    pub mod summary;
}

pub mod handlers {
    pub mod dashboard;
    pub mod history;
    pub mod price;
    pub mod summary;
}

pub mod jobs {
    pub mod dashboard_refresh;
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/api/options", get(handlers::dashboard::get_options))
        .route("/api/price", get(handlers::price::get_price))
        .route("/api/history", get(handlers::history::get_history))
        .route("/api/summary", get(handlers::summary::get_summary))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/refresh", post(handlers::dashboard::refresh_dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Crypto Price Tracker"
}
