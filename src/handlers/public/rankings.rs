use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::services::{RankingEntry, RankingService, UnitFilter};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    /// Omit for the all-time board.
    pub season_id: Option<i64>,
    /// `all` (default), `excel`, `crew` or `vip`.
    pub unit: Option<String>,
}

/// GET /api/rankings - donation ranking board
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<RankingQuery>) -> ApiResult<Vec<RankingEntry>> {
    let filter = query
        .unit
        .as_deref()
        .map(str::parse::<UnitFilter>)
        .transpose()
        .map_err(ApiError::bad_request)?
        .unwrap_or_default();

    let ranked = RankingService::new(state.store.clone())
        .season_ranking(query.season_id, filter)
        .await?;
    Ok(ApiResponse::success(ranked))
}
