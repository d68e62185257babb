use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::record_fields;
use crate::store::{Collection, Record};

use super::Unit;

/// A member of the organization chart. `role` is a free-text title (`대표`, `R대표`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub unit: Unit,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub position_order: i32,
    #[serde(default)]
    pub profile_info: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial member update. Required columns reject `null`; nullable ones accept
/// it and clear the column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub position_order: Option<i32>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub profile_info: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

record_fields! {
    pub enum MemberField {
        Id => "id",
        Name => "name",
        Role => "role",
        Unit => "unit",
        IsActive => "is_active",
        PositionOrder => "position_order",
        ProfileInfo => "profile_info",
        ImageUrl => "image_url",
    }
}

impl Record for OrganizationMember {
    const COLLECTION: Collection = Collection::Organization;
    type Field = MemberField;
}
