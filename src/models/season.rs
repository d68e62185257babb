use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record_fields;
use crate::store::{Collection, Draft, Record};

use super::Unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: bool,
}

record_fields! {
    pub enum SeasonField {
        Id => "id",
        Name => "name",
        StartDate => "start_date",
        EndDate => "end_date",
        IsActive => "is_active",
    }
}

impl Record for Season {
    const COLLECTION: Collection = Collection::Seasons;
    type Field = SeasonField;
}

/// Materialized top-N row for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRanking {
    pub id: i64,
    pub season_id: i64,
    pub rank: i32,
    pub donor_name: String,
    pub total_amount: i64,
    #[serde(default)]
    pub donation_count: i64,
    #[serde(default)]
    pub unit: Option<Unit>,
}

record_fields! {
    pub enum RankingField {
        Id => "id",
        SeasonId => "season_id",
        Rank => "rank",
        DonorName => "donor_name",
        TotalAmount => "total_amount",
        DonationCount => "donation_count",
        Unit => "unit",
    }
}

impl Record for SeasonRanking {
    const COLLECTION: Collection = Collection::SeasonRankings;
    type Field = RankingField;
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSeasonRanking {
    pub season_id: i64,
    pub rank: i32,
    pub donor_name: String,
    pub total_amount: i64,
    pub donation_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl Draft for NewSeasonRanking {
    type Record = SeasonRanking;
}
