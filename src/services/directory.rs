use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::models::{
    MemberField, OrganizationMember, ScheduleEvent, ScheduleField, Season, SeasonField, Signature, SignatureField,
    Unit,
};
use crate::store::{Select, Selected, Store, StoreError};

/// Read side of the public site: organization chart, calendar, signature gallery, seasons.
pub struct DirectoryService {
    store: Store,
}

impl DirectoryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Public member directory, ordered by unit then name.
    pub async fn members(&self, unit: Option<Unit>, active: Option<bool>) -> Result<Vec<OrganizationMember>, StoreError> {
        let query = Select::<OrganizationMember>::new()
            .eq_opt(MemberField::Unit, unit)
            .eq_opt(MemberField::IsActive, active)
            .asc(MemberField::Unit)
            .asc(MemberField::Name);
        self.store.select_all(query).await
    }

    /// Admin listing, in display order within each unit.
    pub async fn members_by_position(&self, unit: Option<Unit>) -> Result<Vec<OrganizationMember>, StoreError> {
        let query = Select::<OrganizationMember>::new()
            .eq_opt(MemberField::Unit, unit)
            .asc(MemberField::Unit)
            .asc(MemberField::PositionOrder);
        self.store.select_all(query).await
    }

    /// Events starting in `[from, to)`, earliest first. A unit filter keeps
    /// events without a unit, which apply to everyone.
    pub async fn schedules(
        &self,
        unit: Option<Unit>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduleEvent>, StoreError> {
        let mut query = Select::<ScheduleEvent>::new();
        if let Some(from) = from {
            query = query.gte(ScheduleField::StartDatetime, from.to_rfc3339());
        }
        if let Some(to) = to {
            query = query.lt(ScheduleField::StartDatetime, to.to_rfc3339());
        }
        let events = self.store.select_all(query.asc(ScheduleField::StartDatetime)).await?;

        Ok(match unit {
            Some(unit) => events.into_iter().filter(|e| e.unit.map_or(true, |u| u == unit)).collect(),
            None => events,
        })
    }

    /// Signature gallery ordered by number, with the exact total.
    pub async fn signatures(&self, unit: Option<Unit>, limit: Option<u32>) -> Result<Selected<Signature>, StoreError> {
        let mut query = Select::<Signature>::new()
            .eq_opt(SignatureField::Unit, unit)
            .asc(SignatureField::SigNumber)
            .count();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.store.select(query).await
    }

    pub async fn active_season(&self) -> Result<Option<Season>, StoreError> {
        let query = Select::<Season>::new()
            .eq(SeasonField::IsActive, true)
            .desc(SeasonField::StartDate)
            .limit(1);
        Ok(self.store.select(query).await?.rows.into_iter().next())
    }
}

/// `[first day, first day of next month)` in UTC.
pub fn month_window(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use crate::testing::TestContext;

    fn service() -> DirectoryService {
        DirectoryService::new(TestContext::new().store)
    }

    #[tokio::test]
    async fn members_are_ordered_by_unit_then_name() {
        let members = service().members(None, Some(true)).await.unwrap();
        let names: Vec<_> = members.iter().map(|m| (m.unit, m.name.as_str())).collect();
        assert_eq!(names, vec![(Unit::Crew, "다온"), (Unit::Excel, "가윤"), (Unit::Excel, "린아")]);
    }

    #[tokio::test]
    async fn signatures_sort_by_number_with_total() {
        let page = service().signatures(Some(Unit::Excel), Some(1)).await.unwrap();
        assert_eq!(page.total_count, Some(2));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].sig_number, 3);
    }

    #[tokio::test]
    async fn schedules_window_and_unit_keep_shared_events() {
        let (from, to) = month_window(2025, 3).unwrap();
        let march = service().schedules(None, Some(from), Some(to)).await.unwrap();
        assert_eq!(march.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1]);

        let excel = service().schedules(Some(Unit::Excel), None, None).await.unwrap();
        assert_eq!(excel.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(excel[1].event_type, EventType::Holiday);
    }

    #[tokio::test]
    async fn unit_schedule_filter_sees_events_past_the_read_cap() {
        use crate::store::{Collection, MemoryStore};
        use serde_json::json;
        use std::sync::Arc;

        let mut events: Vec<_> = (1..=150)
            .map(|id| json!({ "id": id, "title": "합방", "unit": "crew", "event_type": "collab", "start_datetime": "2025-03-01T12:00:00Z" }))
            .collect();
        events.push(json!({ "id": 151, "title": "정기 방송", "unit": "excel", "event_type": "broadcast", "start_datetime": "2025-03-20T11:00:00Z" }));
        let memory = MemoryStore::new().with_rows(Collection::Schedules, events);
        let service = DirectoryService::new(Store::new(Arc::new(memory)).with_max_limit(Some(100)));

        let excel = service.schedules(Some(Unit::Excel), None, None).await.unwrap();
        assert_eq!(excel.iter().map(|e| e.id).collect::<Vec<_>>(), vec![151]);
        assert_eq!(service.schedules(None, None, None).await.unwrap().len(), 151);
    }

    #[tokio::test]
    async fn finds_the_active_season() {
        let season = service().active_season().await.unwrap().unwrap();
        assert_eq!(season.id, 5);
    }

    #[test]
    fn month_window_rolls_over_december() {
        let (from, to) = month_window(2024, 12).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert!(month_window(2024, 13).is_none());
    }
}
