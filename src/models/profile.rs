use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::record_fields;
use crate::store::{Collection, Record};

use super::Unit;

/// Account role. `Owner` is persisted as `superadmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Vip,
    Moderator,
    Admin,
    #[serde(rename = "superadmin", alias = "owner")]
    Owner,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Member, Role::Vip, Role::Moderator, Role::Admin, Role::Owner];

    /// Stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Vip => "vip",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::Owner => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "vip" => Ok(Role::Vip),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            "superadmin" | "owner" => Ok(Role::Owner),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl From<Role> for Value {
    fn from(role: Role) -> Self {
        Value::String(role.as_str().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub total_donation: i64,
}

record_fields! {
    pub enum ProfileField {
        Id => "id",
        Nickname => "nickname",
        Email => "email",
        AvatarUrl => "avatar_url",
        Role => "role",
        Unit => "unit",
        TotalDonation => "total_donation",
    }
}

impl Record for Profile {
    const COLLECTION: Collection = Collection::Profiles;
    type Field = ProfileField;
}
