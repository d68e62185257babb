// Two tiers: public routes (no session required) and admin routes (behind the admin gate)
pub mod admin;
pub mod public;

use crate::error::ApiError;
use crate::models::Unit;

/// Optional `unit` query parameter; empty and `all` mean no filter.
pub(crate) fn parse_unit(raw: Option<&str>) -> Result<Option<Unit>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::bad_request),
    }
}
