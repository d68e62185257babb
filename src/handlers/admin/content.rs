use axum::extract::State;
use serde::Deserialize;

use crate::handlers::parse_unit;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::models::{ScheduleEvent, Signature};
use crate::services::DirectoryService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnitQuery {
    pub unit: Option<String>,
}

/// GET /admin/schedules
pub async fn schedules(State(state): State<AppState>, ApiQuery(query): ApiQuery<UnitQuery>) -> ApiResult<Vec<ScheduleEvent>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let events = DirectoryService::new(state.store.clone()).schedules(unit, None, None).await?;
    Ok(ApiResponse::success(events))
}

/// GET /admin/signatures
pub async fn signatures(State(state): State<AppState>, ApiQuery(query): ApiQuery<UnitQuery>) -> ApiResult<Vec<Signature>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let page = DirectoryService::new(state.store.clone()).signatures(unit, None).await?;
    Ok(ApiResponse::with_total(page.rows, page.total_count))
}
