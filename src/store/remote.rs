use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::filter::Filter;

use super::{Collection, StoreError};

/// Raw rows plus the exact count when the filter requested one.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub rows: Vec<Value>,
    pub total_count: Option<u64>,
}

/// Untyped record operations against a backing store. Every call is a single
/// statement attempted once; there are no client-side transactions.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short name for logs ("rest", "memory").
    fn kind(&self) -> &'static str;

    async fn select(&self, collection: Collection, filter: &Filter) -> Result<RowSet, StoreError>;

    async fn insert(&self, collection: Collection, rows: Vec<Value>) -> Result<Vec<Value>, StoreError>;

    /// Apply `patch` to every row matching `filter`; returns the updated rows.
    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Remove every row matching `filter`; returns the removed rows.
    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;
}
