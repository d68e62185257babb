use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::filter::FilterError;

/// Machine-readable classification of a store failure. Callers decide
/// whether a code is worth retrying; the store itself never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorCode {
    /// The collection does not exist (schema not migrated yet).
    RelationNotFound,
    Network,
    Auth,
    ConstraintViolation,
    InvalidQuery,
    Decode,
    Remote,
}

impl StoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorCode::RelationNotFound => "relation_not_found",
            StoreErrorCode::Network => "network",
            StoreErrorCode::Auth => "auth",
            StoreErrorCode::ConstraintViolation => "constraint_violation",
            StoreErrorCode::InvalidQuery => "invalid_query",
            StoreErrorCode::Decode => "decode",
            StoreErrorCode::Remote => "remote",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} ({code})")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn relation_not_found(collection: &str) -> Self {
        Self::new(
            StoreErrorCode::RelationNotFound,
            format!("relation \"{}\" does not exist", collection),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Decode, message)
    }

    /// Classify an error response from the remote data API.
    ///
    /// Error bodies look like `{"code": "42P01", "message": "...", "details": ..., "hint": ...}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("remote store responded with status {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        let kind = match code {
            "42P01" | "PGRST205" => StoreErrorCode::RelationNotFound,
            "42501" | "PGRST301" | "PGRST302" => StoreErrorCode::Auth,
            c if c.starts_with("23") => StoreErrorCode::ConstraintViolation,
            c if c.starts_with("PGRST1") || c == "42703" => StoreErrorCode::InvalidQuery,
            _ => match status {
                401 | 403 => StoreErrorCode::Auth,
                404 => StoreErrorCode::RelationNotFound,
                409 => StoreErrorCode::ConstraintViolation,
                _ => StoreErrorCode::Remote,
            },
        };
        Self::new(kind, message)
    }
}

impl From<FilterError> for StoreError {
    fn from(err: FilterError) -> Self {
        Self::new(StoreErrorCode::InvalidQuery, err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_remote_error_bodies() {
        let missing = StoreError::from_response(
            404,
            r#"{"code":"42P01","message":"relation \"public.season_donation_rankings\" does not exist"}"#,
        );
        assert_eq!(missing.code, StoreErrorCode::RelationNotFound);
        assert!(missing.message.contains("season_donation_rankings"));

        let schema_cache = StoreError::from_response(404, r#"{"code":"PGRST205","message":"Could not find the table"}"#);
        assert_eq!(schema_cache.code, StoreErrorCode::RelationNotFound);

        let dup = StoreError::from_response(409, r#"{"code":"23505","message":"duplicate key value"}"#);
        assert_eq!(dup.code, StoreErrorCode::ConstraintViolation);

        let jwt = StoreError::from_response(401, r#"{"code":"PGRST301","message":"JWT expired"}"#);
        assert_eq!(jwt.code, StoreErrorCode::Auth);
    }

    #[test]
    fn falls_back_to_status_when_body_is_opaque() {
        let err = StoreError::from_response(403, "");
        assert_eq!(err.code, StoreErrorCode::Auth);
        assert!(err.message.contains("403"));

        let err = StoreError::from_response(500, "upstream exploded");
        assert_eq!(err.code, StoreErrorCode::Remote);
        assert_eq!(err.message, "upstream exploded");
    }

    #[test]
    fn display_carries_message_and_code() {
        let err = StoreError::relation_not_found("signatures");
        assert_eq!(err.to_string(), "relation \"signatures\" does not exist (relation_not_found)");
    }
}
