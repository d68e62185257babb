use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::middleware::{AdminUser, ApiQuery, ApiResponse, ApiResult};
use crate::models::SeasonRanking;
use crate::services::RankingService;
use crate::state::AppState;

use super::require_full_admin;

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season_id: i64,
}

/// GET /admin/rankings?season_id= - the stored top ranking
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<SeasonQuery>) -> ApiResult<Vec<SeasonRanking>> {
    let rows = RankingService::new(state.store.clone())
        .stored_rankings(query.season_id, None)
        .await?;
    Ok(ApiResponse::success(rows))
}

/// POST /admin/rankings/rebuild?season_id= - recompute the stored ranking (owner/admin only)
pub async fn rebuild(
    State(state): State<AppState>,
    Extension(user): Extension<AdminUser>,
    ApiQuery(query): ApiQuery<SeasonQuery>,
) -> ApiResult<Vec<SeasonRanking>> {
    require_full_admin(&user)?;
    let rows = RankingService::new(state.store.clone())
        .rebuild_season_rankings(query.season_id)
        .await?;
    Ok(ApiResponse::created(rows))
}
