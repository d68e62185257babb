use serde_json::Value;
use tracing::{info, warn};

use crate::models::{
    DonationField, DonationRecord, MemberField, MemberPatch, NewScheduleEvent, OrganizationMember, ScheduleEvent, Unit,
};
use crate::store::{Delete, Store, StoreError, Update};

/// Write side used by the admin routes and the `rg-admin` commands.
pub struct MaintenanceService {
    store: Store,
}

impl MaintenanceService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Set the role title of the member identified by name within a unit.
    pub async fn set_member_role(&self, name: &str, unit: Unit, role: &str) -> Result<Vec<OrganizationMember>, StoreError> {
        let update = Update::<OrganizationMember>::new()
            .eq(MemberField::Name, name)
            .eq(MemberField::Unit, unit)
            .set(MemberField::Role, role);
        let updated = self.store.update(update).await?;
        if updated.is_empty() {
            warn!("No member named '{}' in unit {}", name, unit);
        } else {
            info!("Set role of '{}' ({}) to '{}'", name, unit, role);
        }
        Ok(updated)
    }

    /// Mark the member with this name and role active at a display position.
    pub async fn activate_member(
        &self,
        name: &str,
        role: &str,
        position_order: i32,
    ) -> Result<Vec<OrganizationMember>, StoreError> {
        let update = Update::<OrganizationMember>::new()
            .eq(MemberField::Name, name)
            .eq(MemberField::Role, role)
            .set(MemberField::IsActive, true)
            .set(MemberField::PositionOrder, position_order);
        let updated = self.store.update(update).await?;
        info!("Activated {} member(s) named '{}' ({})", updated.len(), name, role);
        Ok(updated)
    }

    /// Apply a partial member update, filtered by name and unit. Values are
    /// checked against the member columns before anything is written.
    pub async fn patch_members(&self, name: &str, unit: Unit, payload: Value) -> Result<Vec<OrganizationMember>, crate::error::ApiError> {
        let update = Update::<OrganizationMember>::from_typed_json::<MemberPatch>(payload)?
            .eq(MemberField::Name, name)
            .eq(MemberField::Unit, unit);
        Ok(self.store.update(update).await?)
    }

    /// Irreversibly delete every donation of a season.
    pub async fn purge_season_donations(&self, season_id: i64) -> Result<Vec<DonationRecord>, StoreError> {
        let removed = self
            .store
            .delete(Delete::<DonationRecord>::new().eq(DonationField::SeasonId, season_id))
            .await?;
        info!("Purged {} donation(s) from season {}", removed.len(), season_id);
        Ok(removed)
    }

    pub async fn seed_schedules(&self, events: &[NewScheduleEvent]) -> Result<Vec<ScheduleEvent>, StoreError> {
        let inserted = self.store.insert(events).await?;
        info!("Inserted {} schedule event(s)", inserted.len());
        Ok(inserted)
    }
}
