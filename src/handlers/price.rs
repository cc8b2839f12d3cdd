use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::models::dashboard::{ErrorResponse, PriceQuery, PriceResponse};
use crate::models::selection::{validate_coin_id, Currency};
use crate::AppState;

/// Handler for GET /api/price
/// Current price tile for one coin (defaults to the first configured coin)
pub async fn get_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, (StatusCode, Json<ErrorResponse>)> {
    let defaults = state.dashboard.defaults();

    let coin_id = match query.coin.as_deref() {
        Some(raw) => raw.trim().to_lowercase(),
        None => defaults.primary_coin().unwrap_or("bitcoin").to_string(),
    };
    validate_coin_id(&coin_id).map_err(bad_request)?;

    let currency = match query.currency.as_deref() {
        Some(raw) => raw.parse::<Currency>().map_err(bad_request)?,
        None => defaults.currency,
    };

    tracing::debug!("Price tile requested for {} in {}", coin_id, currency);

    Ok(Json(state.dashboard.price(&coin_id, currency).await))
}

pub(crate) fn bad_request(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
