use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Unknown field '{field}' for {collection}")]
    UnknownField { collection: &'static str, field: String },

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Update requires at least one field")]
    EmptyPatch,

    #[error("Refusing unfiltered {0}")]
    Unfiltered(&'static str),
}
