use axum::{extract::State, Json};

use crate::models::dashboard::{DashboardView, OptionsResponse};
use crate::models::selection::{Currency, Days, REFRESH_INTERVALS, SUPPORTED_COINS};
use crate::AppState;

/// Handler for GET /api/dashboard
/// Latest view built for the configured selection
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard.latest().await)
}

/// Handler for POST /api/refresh
/// Rebuilds the view now; cached upstream data younger than the TTL is reused
pub async fn refresh_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    tracing::info!("Manual dashboard refresh requested");
    Json(state.dashboard.refresh().await)
}

/// Handler for GET /api/options
pub async fn get_options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        coins: SUPPORTED_COINS.to_vec(),
        currencies: Currency::ALL.to_vec(),
        min_days: Days::MIN,
        max_days: Days::MAX,
        refresh_intervals: REFRESH_INTERVALS.to_vec(),
        defaults: state.dashboard.defaults().clone(),
        refresh_interval_secs: state.refresh_interval_secs,
    })
}
