use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Evaluated, FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection};

/// Untyped query description shared by every store back end: projection,
/// conditions (ANDed), ordering, paging and an optional exact-count request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    select_columns: Vec<String>,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u32>,
    offset: Option<u32>,
    count: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, columns: Vec<String>) -> &mut Self {
        self.select_columns = columns;
        self
    }

    /// Add a condition. Equality against null becomes `IS NULL`.
    pub fn condition(&mut self, column: impl Into<String>, operator: FilterOp, data: Value) -> &mut Self {
        let operator = match (operator, &data) {
            (FilterOp::Eq, Value::Null) => FilterOp::Is,
            (op, _) => op,
        };
        self.conditions.push(FilterWhereInfo { column: column.into(), operator, data });
        self
    }

    pub fn order(&mut self, column: impl Into<String>, sort: SortDirection) -> &mut Self {
        self.order_data.push(FilterOrderInfo { column: column.into(), sort });
        self
    }

    pub fn limit(&mut self, limit: u32, offset: Option<u32>) -> &mut Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn count(&mut self, count: bool) -> &mut Self {
        self.count = count;
        self
    }

    /// Cap the row limit at `max`, applying it when no limit was requested.
    pub fn cap_limit(&mut self, max: u32) -> &mut Self {
        match self.limit {
            Some(limit) if limit > max => {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max);
                self.limit = Some(max);
            }
            Some(_) => {}
            None => self.limit = Some(max),
        }
        self
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn wants_count(&self) -> bool {
        self.count
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn orders(&self) -> &[FilterOrderInfo] {
        &self.order_data
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Check every referenced column name before the filter leaves the process.
    pub fn validate(&self) -> Result<(), FilterError> {
        let columns = self
            .select_columns
            .iter()
            .filter(|c| c.as_str() != "*")
            .chain(self.conditions.iter().map(|c| &c.column))
            .chain(self.order_data.iter().map(|o| &o.column));
        for column in columns {
            Self::validate_column(column)?;
        }
        Ok(())
    }

    /// Query-string pairs for the remote data API.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, FilterError> {
        self.validate()?;
        let mut pairs = vec![("select".to_string(), self.build_select_clause())];
        for condition in &self.conditions {
            pairs.push(FilterWhere::to_postgrest(condition)?);
        }
        if let Some(order) = FilterOrder::to_postgrest(&self.order_data) {
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        Ok(pairs)
    }

    /// Does `row` satisfy every condition?
    pub fn matches(&self, row: &Value) -> Result<bool, FilterError> {
        for condition in &self.conditions {
            if !FilterWhere::matches(condition, row)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Apply the whole filter to an in-memory row set.
    pub fn evaluate(&self, rows: &[Value]) -> Result<Evaluated, FilterError> {
        self.validate()?;
        let mut matched = Vec::new();
        for row in rows {
            if self.matches(row)? {
                matched.push(row.clone());
            }
        }

        let total_count = self.count.then_some(matched.len() as u64);
        FilterOrder::sort(&mut matched, &self.order_data);

        let offset = self.offset.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let rows = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| self.project(row))
            .collect();

        Ok(Evaluated { rows, total_count })
    }

    fn project(&self, row: Value) -> Value {
        if self.select_columns.is_empty() || self.select_columns.iter().any(|c| c == "*") {
            return row;
        }
        match row {
            Value::Object(mut obj) => {
                let projected = self
                    .select_columns
                    .iter()
                    .filter_map(|c| obj.remove(c).map(|v| (c.clone(), v)))
                    .collect();
                Value::Object(projected)
            }
            other => other,
        }
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let mut chars = column.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.iter().any(|c| c == "*") {
            "*".to_string()
        } else {
            self.select_columns.join(",")
        }
    }
}
