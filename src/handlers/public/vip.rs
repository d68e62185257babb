use axum::{
    extract::State,
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::auth::{gate, AuthState};
use crate::error::ApiError;
use crate::middleware::{extract_token, ApiQuery, ApiResponse, ApiResult};
use crate::services::{DirectoryService, RankingService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoungeQuery {
    /// Defaults to the active season.
    pub season_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LoungePass {
    pub season_id: Option<i64>,
    pub rank: Option<u32>,
}

/// GET /api/vip/lounge - admits full admins and the season's top donors
pub async fn lounge(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<LoungeQuery>,
) -> ApiResult<LoungePass> {
    let token = extract_token(&headers, &state.config.security.session_cookie);
    let auth = state.sessions.resolve(token.as_deref()).await;
    let identity = match &auth {
        AuthState::Loading => return Err(ApiError::service_unavailable("Checking permissions")),
        AuthState::Anonymous => return Err(ApiError::unauthorized("Sign in to enter the VIP lounge")),
        AuthState::Authenticated { identity, .. } => identity,
    };

    let season_id = match query.season_id {
        Some(id) => Some(id),
        None => DirectoryService::new(state.store.clone()).active_season().await?.map(|s| s.id),
    };
    let rank = RankingService::new(state.store.clone())
        .rank_of(season_id, &identity.id.to_string())
        .await?;

    if !gate::has_vip_lounge_access(rank, auth.profile()) {
        return Err(ApiError::forbidden("VIP lounge is limited to the top donors"));
    }
    Ok(ApiResponse::success(LoungePass { season_id, rank }))
}
