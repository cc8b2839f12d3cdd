use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::handlers::price::bad_request;
use crate::models::dashboard::{ErrorResponse, SelectionQuery, SummaryResponse};
use crate::models::selection::Selection;
use crate::AppState;

/// Handler for GET /api/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let selection = Selection::with_overrides(
        state.dashboard.defaults(),
        query.coins.as_deref(),
        query.currency.as_deref(),
        query.days.as_deref(),
    )
    .map_err(bad_request)?;

    Ok(Json(state.dashboard.summary(&selection).await))
}
