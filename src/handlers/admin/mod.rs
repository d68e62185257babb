pub mod content;
pub mod dashboard;
pub mod donations;
pub mod members;
pub mod rankings;

use crate::error::ApiError;
use crate::middleware::AdminUser;

/// Destructive operations are limited to owners and admins.
pub(crate) fn require_full_admin(user: &AdminUser) -> Result<(), ApiError> {
    if user.has_full_access() {
        Ok(())
    } else {
        tracing::warn!("User {} ({}) attempted a full-admin operation", user.identity.id, user.profile.role);
        Err(ApiError::forbidden("This operation requires an owner or admin role"))
    }
}
