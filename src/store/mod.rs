pub mod error;
pub mod memory;
pub mod query;
pub mod remote;
pub mod rest;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::filter::SortDirection;

pub use error::{StoreError, StoreErrorCode};
pub use memory::MemoryStore;
pub use query::{Delete, Draft, Field, Record, Select, Selected, Update};
pub use remote::{RemoteStore, RowSet};
pub use rest::RestStore;

/// Named collections in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    Organization,
    Donations,
    Signatures,
    Schedules,
    Seasons,
    SeasonRankings,
}

impl Collection {
    pub const ALL: &'static [Collection] = &[
        Collection::Profiles,
        Collection::Organization,
        Collection::Donations,
        Collection::Signatures,
        Collection::Schedules,
        Collection::Seasons,
        Collection::SeasonRankings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Organization => "organization",
            Collection::Donations => "donations",
            Collection::Signatures => "signatures",
            Collection::Schedules => "schedules",
            Collection::Seasons => "seasons",
            Collection::SeasonRankings => "season_donation_rankings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StoreError::relation_not_found(s))
    }
}

/// Page size for [`Store::select_all`] when no `API_MAX_LIMIT` is configured.
const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Typed entry point for record operations. Cheap to clone; the back end is shared.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn RemoteStore>,
    max_limit: Option<u32>,
}

impl Store {
    pub fn new(backend: Arc<dyn RemoteStore>) -> Self {
        Self { backend, max_limit: None }
    }

    pub fn with_max_limit(mut self, max_limit: Option<u32>) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Mock-data mode gets the in-process store (seeded from `MOCK_DATA_PATH`
    /// when set); otherwise the remote data API.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store = &config.store;
        let backend: Arc<dyn RemoteStore> = if store.use_mock_data {
            match &store.mock_data_path {
                Some(path) => Arc::new(MemoryStore::from_seed_file(path).await?),
                None => Arc::new(MemoryStore::new()),
            }
        } else {
            if store.url.is_empty() || store.service_key.is_empty() {
                return Err(StoreError::new(StoreErrorCode::Auth, "remote store credentials are not configured"));
            }
            let timeout = Duration::from_secs(store.request_timeout_secs);
            Arc::new(RestStore::new(&store.url, store.service_key.clone(), timeout)?)
        };
        info!("Record store ready ({} backend)", backend.kind());
        Ok(Self::new(backend).with_max_limit(config.api.max_limit))
    }

    pub fn kind(&self) -> &'static str {
        self.backend.kind()
    }

    pub async fn select<T: Record>(&self, query: Select<T>) -> Result<Selected<T>, StoreError> {
        let mut filter = query.into_filter();
        if let Some(max) = self.max_limit {
            filter.cap_limit(max);
        }
        debug!("select {} {:?}", T::COLLECTION, filter);
        let set = self.backend.select(T::COLLECTION, &filter).await?;
        Ok(Selected { rows: decode_rows(set.rows)?, total_count: set.total_count })
    }

    /// Every matching row, read page by page. For aggregations that must see the
    /// whole collection; any limit on the query is replaced by paging.
    pub async fn select_all<T: Record>(&self, query: Select<T>) -> Result<Vec<T>, StoreError> {
        let mut filter = query.into_filter();
        // id breaks ties so pages neither overlap nor skip rows
        filter.order("id", SortDirection::Asc).count(false);
        let page_size = self.max_limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let mut rows = Vec::new();
        let mut offset = 0;
        loop {
            filter.limit(page_size, Some(offset));
            debug!("select all {} {:?}", T::COLLECTION, filter);
            let set = self.backend.select(T::COLLECTION, &filter).await?;
            let fetched = set.rows.len();
            rows.extend(decode_rows::<T>(set.rows)?);
            if fetched < page_size as usize {
                return Ok(rows);
            }
            offset += page_size;
        }
    }

    /// Exact number of rows matching the query.
    pub async fn count<T: Record>(&self, query: Select<T>) -> Result<u64, StoreError> {
        let mut filter = query.into_filter();
        filter.count(true).limit(1, None);
        let set = self.backend.select(T::COLLECTION, &filter).await?;
        Ok(set.total_count.unwrap_or(set.rows.len() as u64))
    }

    pub async fn update<T: Record>(&self, query: Update<T>) -> Result<Vec<T>, StoreError> {
        let (filter, patch) = query.into_parts()?;
        debug!("update {} {:?} set {:?}", T::COLLECTION, filter, patch);
        decode_rows(self.backend.update(T::COLLECTION, &filter, patch).await?)
    }

    pub async fn delete<T: Record>(&self, query: Delete<T>) -> Result<Vec<T>, StoreError> {
        let filter = query.into_checked_filter()?;
        debug!("delete {} {:?}", T::COLLECTION, filter);
        decode_rows(self.backend.delete(T::COLLECTION, &filter).await?)
    }

    pub async fn insert<D: Draft>(&self, drafts: &[D]) -> Result<Vec<D::Record>, StoreError> {
        if drafts.is_empty() {
            return Ok(vec![]);
        }
        let rows = drafts.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
        let collection = <D::Record as Record>::COLLECTION;
        debug!("insert {} rows into {}", rows.len(), collection);
        decode_rows(self.backend.insert(collection, rows).await?)
    }
}

fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| StoreError::decode(format!("malformed {} row: {}", T::COLLECTION, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonationField, DonationRecord};
    use serde_json::json;

    fn capped_store(rows: i64, cap: u32) -> Store {
        let donations = (1..=rows)
            .map(|id| json!({ "id": id, "season_id": 1, "donor_name": format!("donor-{}", id), "amount": id }))
            .collect();
        let memory = MemoryStore::new().with_rows(Collection::Donations, donations);
        Store::new(Arc::new(memory)).with_max_limit(Some(cap))
    }

    #[tokio::test]
    async fn select_is_capped_but_select_all_reads_every_page() {
        let store = capped_store(250, 100);

        let capped = store.select(Select::<DonationRecord>::new()).await.unwrap();
        assert_eq!(capped.rows.len(), 100);

        let all = store.select_all(Select::<DonationRecord>::new().limit(5)).await.unwrap();
        assert_eq!(all.len(), 250);
        let mut ids: Vec<i64> = all.iter().map(|d| d.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 250);
    }

    #[tokio::test]
    async fn select_all_keeps_the_requested_order() {
        let store = capped_store(30, 7);

        let all = store
            .select_all(Select::<DonationRecord>::new().desc(DonationField::Amount))
            .await
            .unwrap();
        assert_eq!(all.len(), 30);
        assert!(all.windows(2).all(|w| w[0].amount >= w[1].amount));
    }

    #[tokio::test]
    async fn select_all_handles_an_exact_multiple_of_the_page() {
        let store = capped_store(20, 10);
        assert_eq!(store.select_all(Select::<DonationRecord>::new()).await.unwrap().len(), 20);
    }
}
