use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record_fields;
use crate::store::{Collection, Draft, Record};

use super::Unit;

/// One donation event. Rows are only ever appended or purged per season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: i64,
    pub season_id: i64,
    #[serde(default)]
    pub donor_id: Option<String>,
    pub donor_name: String,
    pub amount: i64,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

record_fields! {
    pub enum DonationField {
        Id => "id",
        SeasonId => "season_id",
        DonorId => "donor_id",
        DonorName => "donor_name",
        Amount => "amount",
        Unit => "unit",
        CreatedAt => "created_at",
    }
}

impl Record for DonationRecord {
    const COLLECTION: Collection = Collection::Donations;
    type Field = DonationField;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    pub season_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<String>,
    pub donor_name: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl Draft for NewDonation {
    type Record = DonationRecord;
}
