use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::handlers::price::bad_request;
use crate::models::dashboard::{ErrorResponse, HistoryResponse, SelectionQuery};
use crate::models::selection::Selection;
use crate::AppState;

/// Handler for GET /api/history
/// Chart series for every selected coin that returned data
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let selection = Selection::with_overrides(
        state.dashboard.defaults(),
        query.coins.as_deref(),
        query.currency.as_deref(),
        query.days.as_deref(),
    )
    .map_err(bad_request)?;

    tracing::info!(
        "Fetching {}-day history for {:?} in {}",
        selection.days,
        selection.coins,
        selection.currency
    );

    Ok(Json(state.dashboard.history(&selection).await))
}
