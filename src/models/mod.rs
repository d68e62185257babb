pub mod donation;
pub mod organization;
pub mod profile;
pub mod schedule;
pub mod season;
pub mod signature;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use donation::{DonationField, DonationRecord, NewDonation};
pub use organization::{MemberField, MemberPatch, OrganizationMember};
pub use profile::{Profile, ProfileField, Role};
pub use schedule::{EventType, NewScheduleEvent, ScheduleEvent, ScheduleField};
pub use season::{NewSeasonRanking, RankingField, Season, SeasonField, SeasonRanking};
pub use signature::{Signature, SignatureField};

/// The two fixed units every unit-scoped record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Excel,
    Crew,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Excel => "excel",
            Unit::Crew => "crew",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" => Ok(Unit::Excel),
            "crew" => Ok(Unit::Crew),
            other => Err(format!("unknown unit '{}' (expected excel or crew)", other)),
        }
    }
}

impl From<Unit> for Value {
    fn from(unit: Unit) -> Self {
        Value::String(unit.as_str().to_string())
    }
}
