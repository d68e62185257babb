use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record_fields;
use crate::store::{Collection, Draft, Record};

use super::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Broadcast,
    Collab,
    Event,
    Notice,
    /// Day off; stored as `休`.
    #[serde(rename = "休", alias = "holiday")]
    Holiday,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Broadcast => "broadcast",
            EventType::Collab => "collab",
            EventType::Event => "event",
            EventType::Notice => "notice",
            EventType::Holiday => "休",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<Unit>,
    pub event_type: EventType,
    pub start_datetime: DateTime<Utc>,
    #[serde(default)]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
}

record_fields! {
    pub enum ScheduleField {
        Id => "id",
        Title => "title",
        Description => "description",
        Unit => "unit",
        EventType => "event_type",
        StartDatetime => "start_datetime",
        EndDatetime => "end_datetime",
        Location => "location",
        IsAllDay => "is_all_day",
        Color => "color",
    }
}

impl Record for ScheduleEvent {
    const COLLECTION: Collection = Collection::Schedules;
    type Field = ScheduleField;
}

/// An event to insert; also the shape of entries in a schedule seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduleEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    pub event_type: EventType,
    pub start_datetime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Draft for NewScheduleEvent {
    type Record = ScheduleEvent;
}
