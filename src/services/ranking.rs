use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{DonationField, DonationRecord, NewSeasonRanking, RankingField, SeasonRanking, Unit};
use crate::store::{Delete, Select, Store, StoreError};

/// How many donors the VIP board and the stored season ranking keep.
pub const VIP_THRESHOLD: usize = 50;

/// Unit selector for ranking boards. `Vip` spans both units but keeps only the top donors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFilter {
    #[default]
    All,
    Excel,
    Crew,
    Vip,
}

impl UnitFilter {
    fn unit(&self) -> Option<Unit> {
        match self {
            UnitFilter::Excel => Some(Unit::Excel),
            UnitFilter::Crew => Some(Unit::Crew),
            UnitFilter::All | UnitFilter::Vip => None,
        }
    }
}

impl FromStr for UnitFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(UnitFilter::All),
            "excel" => Ok(UnitFilter::Excel),
            "crew" => Ok(UnitFilter::Crew),
            "vip" => Ok(UnitFilter::Vip),
            other => Err(format!("unknown unit filter '{}'", other)),
        }
    }
}

impl fmt::Display for UnitFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitFilter::All => "all",
            UnitFilter::Excel => "excel",
            UnitFilter::Crew => "crew",
            UnitFilter::Vip => "vip",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub donor_id: Option<String>,
    pub donor_name: String,
    pub total_amount: i64,
    pub donation_count: i64,
    pub unit: Option<Unit>,
    /// Bar width relative to the first place, 0..=100.
    pub percent: f64,
}

/// Ranking bar width: `value / max` as a percentage, capped at 100.
pub fn bar_percent(value: i64, max: i64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (value as f64 / max as f64 * 100.0).min(100.0)
}

/// Group donations per donor (by id, or by name for anonymous donors) and rank
/// by total, highest first. Ties keep a stable order by donor name.
pub fn aggregate(donations: &[DonationRecord]) -> Vec<RankingEntry> {
    let mut totals: HashMap<String, RankingEntry> = HashMap::new();
    for donation in donations {
        let key = donation.donor_id.clone().unwrap_or_else(|| format!("name:{}", donation.donor_name));
        let entry = totals.entry(key).or_insert_with(|| RankingEntry {
            rank: 0,
            donor_id: donation.donor_id.clone(),
            donor_name: donation.donor_name.clone(),
            total_amount: 0,
            donation_count: 0,
            unit: donation.unit,
            percent: 0.0,
        });
        entry.total_amount += donation.amount;
        entry.donation_count += 1;
    }

    let mut ranked: Vec<RankingEntry> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.donor_name.cmp(&b.donor_name))
    });

    let max = ranked.first().map(|e| e.total_amount).unwrap_or(0);
    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
        entry.percent = bar_percent(entry.total_amount, max);
    }
    ranked
}

pub struct RankingService {
    store: Store,
}

impl RankingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Live ranking computed from raw donations.
    pub async fn season_ranking(
        &self,
        season_id: Option<i64>,
        filter: UnitFilter,
    ) -> Result<Vec<RankingEntry>, StoreError> {
        let query = Select::<DonationRecord>::new()
            .eq_opt(DonationField::SeasonId, season_id)
            .eq_opt(DonationField::Unit, filter.unit());
        let donations = self.store.select_all(query).await?;

        let mut ranked = aggregate(&donations);
        if filter == UnitFilter::Vip {
            ranked.truncate(VIP_THRESHOLD);
        }
        Ok(ranked)
    }

    /// Rank of a donor in the season (1-based), if they donated at all.
    pub async fn rank_of(&self, season_id: Option<i64>, donor_id: &str) -> Result<Option<u32>, StoreError> {
        let ranked = self.season_ranking(season_id, UnitFilter::All).await?;
        Ok(ranked
            .iter()
            .find(|e| e.donor_id.as_deref() == Some(donor_id))
            .map(|e| e.rank))
    }

    /// Replace the stored top ranking for a season with a fresh aggregate.
    pub async fn rebuild_season_rankings(&self, season_id: i64) -> Result<Vec<SeasonRanking>, StoreError> {
        let mut ranked = self.season_ranking(Some(season_id), UnitFilter::All).await?;
        ranked.truncate(VIP_THRESHOLD);

        let removed = self
            .store
            .delete(Delete::<SeasonRanking>::new().eq(RankingField::SeasonId, season_id))
            .await?;

        let rows: Vec<NewSeasonRanking> = ranked
            .into_iter()
            .map(|e| NewSeasonRanking {
                season_id,
                rank: e.rank as i32,
                donor_name: e.donor_name,
                total_amount: e.total_amount,
                donation_count: e.donation_count,
                unit: e.unit,
            })
            .collect();
        let inserted = self.store.insert(&rows).await?;

        info!(
            "Rebuilt season {} ranking: removed {} rows, inserted {}",
            season_id,
            removed.len(),
            inserted.len()
        );
        Ok(inserted)
    }

    /// The stored ranking for a season, best first.
    pub async fn stored_rankings(&self, season_id: i64, unit: Option<Unit>) -> Result<Vec<SeasonRanking>, StoreError> {
        let query = Select::<SeasonRanking>::new()
            .eq(RankingField::SeasonId, season_id)
            .eq_opt(RankingField::Unit, unit)
            .asc(RankingField::Rank);
        Ok(self.store.select(query).await?.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestContext, VIP_ID};

    fn donation(id: i64, donor_id: Option<&str>, name: &str, amount: i64) -> DonationRecord {
        DonationRecord {
            id,
            season_id: 1,
            donor_id: donor_id.map(str::to_string),
            donor_name: name.to_string(),
            amount,
            unit: Some(Unit::Excel),
            created_at: None,
        }
    }

    #[test]
    fn bar_percent_is_capped_and_guarded() {
        assert_eq!(bar_percent(50, 200), 25.0);
        assert_eq!(bar_percent(300, 200), 100.0);
        assert_eq!(bar_percent(10, 0), 0.0);
        assert_eq!(bar_percent(10, -5), 0.0);
    }

    #[test]
    fn aggregates_by_donor_id_then_name() {
        let donations = vec![
            donation(1, Some("u1"), "별빛", 100),
            donation(2, Some("u1"), "별빛(개명)", 300),
            donation(3, None, "달빛", 250),
            donation(4, None, "달빛", 250),
            donation(5, None, "햇살", 50),
        ];
        let ranked = aggregate(&donations);

        assert_eq!(ranked.len(), 3);
        // 400 vs 500: anonymous 달빛 leads
        assert_eq!(ranked[0].donor_name, "달빛");
        assert_eq!(ranked[0].total_amount, 500);
        assert_eq!(ranked[0].donation_count, 2);
        assert_eq!(ranked[0].percent, 100.0);
        assert_eq!(ranked[1].donor_id.as_deref(), Some("u1"));
        assert_eq!(ranked[1].percent, 80.0);
        assert_eq!(ranked.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let ranked = aggregate(&[donation(1, None, "나", 10), donation(2, None, "가", 10)]);
        assert_eq!(ranked[0].donor_name, "가");
        assert_eq!(ranked[1].donor_name, "나");
    }

    #[test]
    fn unit_filters_parse() {
        assert_eq!("".parse::<UnitFilter>().unwrap(), UnitFilter::All);
        assert_eq!("VIP".parse::<UnitFilter>().unwrap(), UnitFilter::Vip);
        assert!("gold".parse::<UnitFilter>().is_err());
    }

    #[tokio::test]
    async fn season_ranking_filters_by_unit_and_season() {
        let service = RankingService::new(TestContext::new().store);

        let all = service.season_ranking(Some(4), UnitFilter::All).await.unwrap();
        assert_eq!(all[0].donor_name, "별빛");
        assert_eq!(all[0].total_amount, 12000);
        assert!(all.windows(2).all(|w| w[0].total_amount >= w[1].total_amount));

        let crew = service.season_ranking(Some(4), UnitFilter::Crew).await.unwrap();
        assert_eq!(crew[0].donor_name, "달빛");
        assert_eq!(crew[0].total_amount, 9000);

        // vip ignores the unit split
        let vip = service.season_ranking(Some(4), UnitFilter::Vip).await.unwrap();
        assert_eq!(vip, all);

        assert_eq!(service.rank_of(Some(4), VIP_ID).await.unwrap(), Some(1));
        assert_eq!(service.rank_of(Some(5), VIP_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn ranking_sees_donations_beyond_the_read_cap() {
        use crate::store::{Collection, MemoryStore};
        use serde_json::json;
        use std::sync::Arc;

        let mut donations: Vec<_> = (1..=100)
            .map(|id| json!({ "id": id, "season_id": 4, "donor_name": "small", "amount": 1 }))
            .collect();
        donations.push(json!({ "id": 101, "season_id": 4, "donor_id": VIP_ID, "donor_name": "whale", "amount": 1_000_000 }));
        let memory = MemoryStore::new().with_rows(Collection::Donations, donations);
        let store = Store::new(Arc::new(memory)).with_max_limit(Some(100));
        let service = RankingService::new(store);

        let ranked = service.season_ranking(Some(4), UnitFilter::All).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].donor_name, "whale");
        assert_eq!(ranked[1].total_amount, 100);
        assert_eq!(service.rank_of(Some(4), VIP_ID).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_rows() {
        let service = RankingService::new(TestContext::new().store);

        let first = service.rebuild_season_rankings(4).await.unwrap();
        assert_eq!(first.len(), 3);
        let second = service.rebuild_season_rankings(4).await.unwrap();
        assert_eq!(second.len(), 3);

        let stored = service.stored_rankings(4, None).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(service.stored_rankings(5, None).await.unwrap().is_empty());
    }
}
