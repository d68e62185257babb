use axum::extract::{Extension, State};
use serde::Serialize;

use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::models::{DonationRecord, OrganizationMember, Role, ScheduleEvent, Season, Signature};
use crate::services::DirectoryService;
use crate::state::AppState;
use crate::store::Select;

#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub members: u64,
    pub donations: u64,
    pub signatures: u64,
    pub schedules: u64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub nickname: String,
    pub role: Role,
    pub full_access: bool,
    pub active_season: Option<Season>,
    pub counts: DashboardCounts,
}

/// GET /admin - overview for the signed-in administrator
pub async fn get(State(state): State<AppState>, Extension(user): Extension<AdminUser>) -> ApiResult<Dashboard> {
    let store = &state.store;
    let directory = DirectoryService::new(store.clone());

    let (members, donations, signatures, schedules, active_season) = futures::try_join!(
        store.count(Select::<OrganizationMember>::new()),
        store.count(Select::<DonationRecord>::new()),
        store.count(Select::<Signature>::new()),
        store.count(Select::<ScheduleEvent>::new()),
        directory.active_season(),
    )?;

    Ok(ApiResponse::success(Dashboard {
        nickname: user.profile.nickname.clone(),
        role: user.profile.role,
        full_access: user.has_full_access(),
        active_season,
        counts: DashboardCounts { members, donations, signatures, schedules },
    }))
}
