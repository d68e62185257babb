use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::filter::{Filter, FilterError, FilterOp, SortDirection};

use super::Collection;

/// A column of a record type. Implemented by the field enums declared with
/// [`record_fields!`](crate::record_fields).
pub trait Field: Copy + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn name(&self) -> &'static str;

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// A row type stored in one collection.
pub trait Record: DeserializeOwned + Send + 'static {
    const COLLECTION: Collection;
    type Field: Field;
}

/// A row that has not been stored yet (ids and timestamps are assigned by the store).
pub trait Draft: Serialize + Send + Sync {
    type Record: Record;
}

/// Declare a field enum mapping variants to column names.
#[macro_export]
macro_rules! record_fields {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $column:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::store::Field for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $column),+
                }
            }
        }
    };
}

/// Marker for read queries.
#[derive(Debug)]
pub enum Read {}
/// Marker for partial updates.
#[derive(Debug)]
pub enum Patch {}
/// Marker for deletes.
#[derive(Debug)]
pub enum Remove {}

pub type Select<T> = Query<T, Read>;
pub type Update<T> = Query<T, Patch>;
pub type Delete<T> = Query<T, Remove>;

/// Typed query over the collection of `T`. Conditions are ANDed.
pub struct Query<T, K> {
    filter: Filter,
    patch: Map<String, Value>,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T: Record, K> Query<T, K> {
    pub fn new() -> Self {
        Self { filter: Filter::new(), patch: Map::new(), _marker: PhantomData }
    }

    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    fn push(mut self, field: T::Field, op: FilterOp, value: Value) -> Self {
        self.filter.condition(field.name(), op, value);
        self
    }

    /// `field = value`; a null value matches `IS NULL`.
    pub fn eq(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Eq, value.into())
    }

    pub fn neq(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Neq, value.into())
    }

    pub fn gt(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Gt, value.into())
    }

    pub fn gte(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Gte, value.into())
    }

    pub fn lt(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Lt, value.into())
    }

    pub fn lte(self, field: T::Field, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Lte, value.into())
    }

    pub fn like(self, field: T::Field, pattern: impl Into<String>) -> Self {
        self.push(field, FilterOp::Like, Value::String(pattern.into()))
    }

    pub fn ilike(self, field: T::Field, pattern: impl Into<String>) -> Self {
        self.push(field, FilterOp::ILike, Value::String(pattern.into()))
    }

    pub fn in_list<V: Into<Value>>(self, field: T::Field, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.push(field, FilterOp::In, Value::Array(values))
    }

    pub fn is_null(self, field: T::Field) -> Self {
        self.push(field, FilterOp::Is, Value::Null)
    }

    /// Apply the filter only when a value is present.
    pub fn eq_opt<V: Into<Value>>(self, field: T::Field, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }
}

impl<T: Record, K> Default for Query<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Query<T, Read> {
    /// Project onto `fields`. Fields the record type requires must be included.
    pub fn columns(mut self, fields: &[T::Field]) -> Self {
        self.filter.select(fields.iter().map(|f| f.name().to_string()).collect());
        self
    }

    pub fn order(mut self, field: T::Field, sort: SortDirection) -> Self {
        self.filter.order(field.name(), sort);
        self
    }

    pub fn asc(self, field: T::Field) -> Self {
        self.order(field, SortDirection::Asc)
    }

    pub fn desc(self, field: T::Field) -> Self {
        self.order(field, SortDirection::Desc)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.filter.limit(limit, None);
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.filter.limit(limit, Some(offset));
        self
    }

    /// Also return the exact number of matching rows.
    pub fn count(mut self) -> Self {
        self.filter.count(true);
        self
    }

    pub(crate) fn into_filter(self) -> Filter {
        self.filter
    }
}

impl<T: Record> Query<T, Patch> {
    pub fn set(mut self, field: T::Field, value: impl Into<Value>) -> Self {
        self.patch.insert(field.name().to_string(), value.into());
        self
    }

    /// Build the partial field set from a JSON object, rejecting unknown fields.
    pub fn from_json(payload: Value) -> Result<Self, FilterError> {
        let Value::Object(map) = payload else {
            return Err(FilterError::InvalidPayload("expected a JSON object".to_string()));
        };
        let mut update = Self::new();
        for (key, value) in map {
            let field = T::Field::parse(&key).ok_or_else(|| FilterError::UnknownField {
                collection: T::COLLECTION.as_str(),
                field: key.clone(),
            })?;
            update = update.set(field, value);
        }
        Ok(update)
    }

    /// Like [`from_json`](Self::from_json), but every value must also decode as
    /// the typed partial record `P`. Only the fields present in `P` are set.
    pub fn from_typed_json<P>(payload: Value) -> Result<Self, FilterError>
    where
        P: DeserializeOwned + Serialize,
    {
        Self::from_json(payload.clone())?;
        let typed: P = serde_json::from_value(payload).map_err(|e| FilterError::InvalidValue(e.to_string()))?;
        let normalized = serde_json::to_value(&typed).map_err(|e| FilterError::InvalidValue(e.to_string()))?;
        Self::from_json(normalized)
    }

    pub fn patch(&self) -> &Map<String, Value> {
        &self.patch
    }

    /// Split into the filter and the field set, refusing empty or unfiltered updates.
    pub(crate) fn into_parts(self) -> Result<(Filter, Map<String, Value>), FilterError> {
        if self.patch.is_empty() {
            return Err(FilterError::EmptyPatch);
        }
        if !self.filter.has_conditions() {
            return Err(FilterError::Unfiltered("update"));
        }
        Ok((self.filter, self.patch))
    }
}

impl<T: Record> Query<T, Remove> {
    /// Refuses deletes without any condition.
    pub(crate) fn into_checked_filter(self) -> Result<Filter, FilterError> {
        if !self.filter.has_conditions() {
            return Err(FilterError::Unfiltered("delete"));
        }
        Ok(self.filter)
    }
}

impl<T, K> fmt::Debug for Query<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filter", &self.filter)
            .field("patch", &self.patch)
            .finish()
    }
}

/// Rows returned by a read, plus the exact count when one was requested.
#[derive(Debug, Clone)]
pub struct Selected<T> {
    pub rows: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> Selected<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
