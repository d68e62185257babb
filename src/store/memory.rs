use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::filter::Filter;

use super::remote::{RemoteStore, RowSet};
use super::{Collection, StoreError};

/// In-process store with the same filter, order and paging semantics as the
/// remote data API. Backs mock-data mode and the test suites.
///
/// A collection that was never seeded behaves like an unmigrated relation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    /// A store where every collection exists and is empty.
    pub fn new() -> Self {
        let tables = Collection::ALL.iter().map(|c| (*c, Vec::new())).collect();
        Self { tables: RwLock::new(tables) }
    }

    /// A store with no collections at all.
    pub fn unmigrated() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, collection: Collection, rows: Vec<Value>) -> Self {
        self.tables.get_mut().entry(collection).or_default().extend(rows);
        self
    }

    /// Load seed rows from a JSON object keyed by collection name.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::decode(format!("cannot read seed file {}: {}", path.display(), e)))?;
        Self::from_seed(serde_json::from_str(&raw)?)
    }

    pub fn from_seed(seed: Value) -> Result<Self, StoreError> {
        let Value::Object(seed) = seed else {
            return Err(StoreError::decode("seed data must be an object keyed by collection"));
        };
        let mut store = Self::new();
        for (name, rows) in seed {
            let collection: Collection = name
                .parse()
                .map_err(|_| StoreError::decode(format!("unknown collection '{}' in seed data", name)))?;
            let Value::Array(rows) = rows else {
                return Err(StoreError::decode(format!("seed rows for '{}' must be an array", name)));
            };
            info!("Seeded {} rows into '{}'", rows.len(), collection);
            store = store.with_rows(collection, rows);
        }
        Ok(store)
    }
}

/// Match every row up front so a bad condition leaves the table untouched.
fn matching(filter: &Filter, rows: &[Value]) -> Result<Vec<bool>, StoreError> {
    Ok(rows.iter().map(|row| filter.matches(row)).collect::<Result<Vec<_>, _>>()?)
}

fn next_numeric_id(rows: &[Value]) -> i64 {
    rows.iter().filter_map(|r| r.get("id").and_then(Value::as_i64)).max().unwrap_or(0) + 1
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, collection: Collection, filter: &Filter) -> Result<RowSet, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(&collection)
            .ok_or_else(|| StoreError::relation_not_found(collection.as_str()))?;
        let evaluated = filter.evaluate(rows)?;
        debug!("Memory select on '{}' matched {} rows", collection, evaluated.rows.len());
        Ok(RowSet { rows: evaluated.rows, total_count: evaluated.total_count })
    }

    async fn insert(&self, collection: Collection, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&collection)
            .ok_or_else(|| StoreError::relation_not_found(collection.as_str()))?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut row) = row else {
                return Err(StoreError::decode("inserted rows must be JSON objects"));
            };
            if !row.contains_key("id") {
                let id = match collection {
                    Collection::Profiles => Value::String(Uuid::new_v4().to_string()),
                    _ => Value::from(next_numeric_id(table)),
                };
                row.insert("id".to_string(), id);
            }
            row.entry("created_at").or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
            let row = Value::Object(row);
            table.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError> {
        filter.validate()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&collection)
            .ok_or_else(|| StoreError::relation_not_found(collection.as_str()))?;

        let hits = matching(filter, table)?;
        let mut updated = Vec::new();
        for (row, hit) in table.iter_mut().zip(hits) {
            if !hit {
                continue;
            }
            if let Value::Object(obj) = row {
                for (key, value) in &patch {
                    obj.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        filter.validate()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&collection)
            .ok_or_else(|| StoreError::relation_not_found(collection.as_str()))?;

        let mut hits = matching(filter, table)?.into_iter();
        let mut removed = Vec::new();
        table.retain(|row| {
            let hit = hits.next().unwrap_or(false);
            if hit {
                removed.push(row.clone());
            }
            !hit
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOp, SortDirection};
    use crate::store::StoreErrorCode;
    use serde_json::json;

    fn donations() -> Vec<Value> {
        vec![
            json!({ "id": 1, "season_id": 4, "donor_name": "별빛", "amount": 3000, "unit": "excel" }),
            json!({ "id": 2, "season_id": 4, "donor_name": "달빛", "amount": 12000, "unit": "crew" }),
            json!({ "id": 3, "season_id": 5, "donor_name": "햇살", "amount": 500, "unit": "excel" }),
            json!({ "id": 4, "season_id": 5, "donor_name": "별빛", "amount": 9000, "unit": "excel" }),
        ]
    }

    fn by_season(season: i64) -> Filter {
        let mut filter = Filter::new();
        filter.condition("season_id", FilterOp::Eq, json!(season));
        filter
    }

    #[tokio::test]
    async fn delete_then_read_returns_nothing_for_that_season() {
        let store = MemoryStore::new().with_rows(Collection::Donations, donations());

        let removed = store.delete(Collection::Donations, &by_season(4)).await.unwrap();
        assert_eq!(removed.len(), 2);

        let after = store.select(Collection::Donations, &by_season(4)).await.unwrap();
        assert!(after.rows.is_empty());

        let others = store.select(Collection::Donations, &by_season(5)).await.unwrap();
        assert_eq!(others.rows.len(), 2);
    }

    #[tokio::test]
    async fn amount_descending_is_non_increasing() {
        let store = MemoryStore::new().with_rows(Collection::Donations, donations());
        let mut filter = Filter::new();
        filter.order("amount", SortDirection::Desc);

        let rows = store.select(Collection::Donations, &filter).await.unwrap().rows;
        let amounts: Vec<i64> = rows.iter().map(|r| r["amount"].as_i64().unwrap()).collect();
        assert_eq!(amounts.len(), 4);
        assert!(amounts.windows(2).all(|w| w[0] >= w[1]), "not descending: {:?}", amounts);
    }

    #[tokio::test]
    async fn update_by_name_and_unit_changes_only_the_patched_field() {
        let member = json!({
            "id": 7, "name": "린아", "role": "멤버", "unit": "excel",
            "is_active": true, "position_order": 3, "profile_info": { "mbti": "ENFP" }
        });
        let store = MemoryStore::new().with_rows(
            Collection::Organization,
            vec![member.clone(), json!({ "id": 8, "name": "린아", "role": "멤버", "unit": "crew" })],
        );

        let mut filter = Filter::new();
        filter
            .condition("name", FilterOp::Eq, json!("린아"))
            .condition("unit", FilterOp::Eq, json!("excel"));
        let mut patch = Map::new();
        patch.insert("role".into(), json!("대표"));

        let updated = store.update(Collection::Organization, &filter, patch).await.unwrap();
        assert_eq!(updated.len(), 1);

        let mut expected = member;
        expected["role"] = json!("대표");
        let rows = store.select(Collection::Organization, &filter).await.unwrap().rows;
        assert_eq!(rows, vec![expected]);

        let mut crew = Filter::new();
        crew.condition("unit", FilterOp::Eq, json!("crew"));
        let untouched = store.select(Collection::Organization, &crew).await.unwrap().rows;
        assert_eq!(untouched[0]["role"], "멤버");
    }

    #[tokio::test]
    async fn unseeded_collection_is_relation_not_found() {
        let store = MemoryStore::unmigrated();
        let err = store.select(Collection::SeasonRankings, &Filter::new()).await.unwrap_err();
        assert_eq!(err.code, StoreErrorCode::RelationNotFound);
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamps() {
        let store = MemoryStore::new().with_rows(Collection::Donations, donations());
        let inserted = store
            .insert(Collection::Donations, vec![json!({ "season_id": 6, "donor_name": "새벽", "amount": 100 })])
            .await
            .unwrap();
        assert_eq!(inserted[0]["id"], 5);
        assert!(inserted[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn counts_ignore_paging() {
        let store = MemoryStore::new().with_rows(Collection::Donations, donations());
        let mut filter = Filter::new();
        filter.count(true).limit(1, None);
        let result = store.select(Collection::Donations, &filter).await.unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.total_count, Some(4));
    }

    #[test]
    fn seed_rejects_unknown_collections() {
        assert!(MemoryStore::from_seed(json!({ "posts": [] })).is_err());
        assert!(MemoryStore::from_seed(json!({ "signatures": [{ "id": 1 }] })).is_ok());
    }
}
