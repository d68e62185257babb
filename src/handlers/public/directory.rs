use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::parse_unit;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::models::{OrganizationMember, ScheduleEvent, Season, Signature};
use crate::services::{month_window, DirectoryService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    pub unit: Option<String>,
    /// Defaults to active members only.
    pub active: Option<bool>,
}

/// GET /api/organization
pub async fn organization(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrganizationQuery>,
) -> ApiResult<Vec<OrganizationMember>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let members = DirectoryService::new(state.store.clone())
        .members(unit, Some(query.active.unwrap_or(true)))
        .await?;
    Ok(ApiResponse::success(members))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub unit: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Calendar month shortcut; used when `from`/`to` are absent.
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/schedules
pub async fn schedules(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> ApiResult<Vec<ScheduleEvent>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let (from, to) = match (query.from, query.to, query.year, query.month) {
        (None, None, Some(year), Some(month)) => {
            let (from, to) = month_window(year, month)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid month {}-{}", year, month)))?;
            (Some(from), Some(to))
        }
        (from, to, _, _) => (from, to),
    };

    let events = DirectoryService::new(state.store.clone()).schedules(unit, from, to).await?;
    Ok(ApiResponse::success(events))
}

#[derive(Debug, Deserialize)]
pub struct SignatureQuery {
    pub unit: Option<String>,
    pub limit: Option<u32>,
}

/// GET /api/signatures - gallery with `meta.total_count`
pub async fn signatures(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SignatureQuery>,
) -> ApiResult<Vec<Signature>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let page = DirectoryService::new(state.store.clone()).signatures(unit, query.limit).await?;
    Ok(ApiResponse::with_total(page.rows, page.total_count))
}

/// GET /api/seasons/active
pub async fn active_season(State(state): State<AppState>) -> ApiResult<Season> {
    let season = DirectoryService::new(state.store.clone())
        .active_season()
        .await?
        .ok_or_else(|| ApiError::not_found("No active season"))?;
    Ok(ApiResponse::success(season))
}
