use std::cmp::Ordering;

use serde_json::Value;

use super::filter_where::compare_values;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// `order=amount.desc,name.asc`, or `None` when no ordering was requested.
    pub fn to_postgrest(infos: &[FilterOrderInfo]) -> Option<String> {
        if infos.is_empty() {
            return None;
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{}.{}", i.column, i.sort.to_postgrest()))
            .collect();
        Some(parts.join(","))
    }

    /// Stable in-place sort. Nulls sort last ascending and first descending,
    /// matching the remote store's defaults.
    pub fn sort(rows: &mut [Value], infos: &[FilterOrderInfo]) {
        if infos.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            for info in infos {
                let left = a.get(&info.column).unwrap_or(&Value::Null);
                let right = b.get(&info.column).unwrap_or(&Value::Null);
                let ordering = match (left.is_null(), right.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => compare_values(left, right).unwrap_or(Ordering::Equal),
                };
                let ordering = match info.sort {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}
