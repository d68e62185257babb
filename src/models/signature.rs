use serde::{Deserialize, Serialize};

use crate::record_fields;
use crate::store::{Collection, Record};

use super::Unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: i64,
    pub sig_number: i32,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub unit: Unit,
}

record_fields! {
    pub enum SignatureField {
        Id => "id",
        SigNumber => "sig_number",
        Title => "title",
        ThumbnailUrl => "thumbnail_url",
        Unit => "unit",
    }
}

impl Record for Signature {
    const COLLECTION: Collection = Collection::Signatures;
    type Field = SignatureField;
}
