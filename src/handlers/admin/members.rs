use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::parse_unit;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::models::OrganizationMember;
use crate::services::{DirectoryService, MaintenanceService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub unit: Option<String>,
}

/// GET /admin/members - every member in display order
pub async fn get(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<OrganizationMember>> {
    let unit = parse_unit(query.unit.as_deref())?;
    let members = DirectoryService::new(state.store.clone()).members_by_position(unit).await?;
    Ok(ApiResponse::success(members))
}

#[derive(Debug, Deserialize)]
pub struct PatchQuery {
    pub name: String,
    pub unit: String,
}

/**
 * PATCH /admin/members?name=&unit= - partial update of the matching member
 *
 * The body is a JSON object of member fields, e.g. `{"role": "대표"}`.
 * Unknown fields are rejected. Returns the updated rows (empty when nothing matched).
 */
pub async fn patch(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PatchQuery>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Vec<OrganizationMember>> {
    let unit = parse_unit(Some(&query.unit))?.ok_or_else(|| ApiError::bad_request("unit is required"))?;
    let updated = MaintenanceService::new(state.store.clone())
        .patch_members(&query.name, unit, payload)
        .await?;
    Ok(ApiResponse::success(updated))
}
