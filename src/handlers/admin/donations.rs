use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::middleware::{AdminUser, ApiQuery, ApiResponse, ApiResult};
use crate::models::{DonationField, DonationRecord};
use crate::services::MaintenanceService;
use crate::state::AppState;
use crate::store::Select;

use super::require_full_admin;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub season_id: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// GET /admin/donations - largest first, with `meta.total_count`
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<DonationRecord>> {
    let mut select = Select::<DonationRecord>::new()
        .eq_opt(DonationField::SeasonId, query.season_id)
        .desc(DonationField::Amount)
        .count();
    if let Some(limit) = query.limit {
        select = select.page(limit, query.offset.unwrap_or(0));
    }

    let page = state.store.select(select).await?;
    Ok(ApiResponse::with_total(page.rows, page.total_count))
}

#[derive(Debug, Deserialize)]
pub struct PurgeQuery {
    pub season_id: i64,
}

/// DELETE /admin/donations?season_id= - remove a season's donations (owner/admin only)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AdminUser>,
    ApiQuery(query): ApiQuery<PurgeQuery>,
) -> ApiResult<Vec<DonationRecord>> {
    require_full_admin(&user)?;
    let removed = MaintenanceService::new(state.store.clone())
        .purge_season_donations(query.season_id)
        .await?;
    Ok(ApiResponse::success(removed))
}
