//! RBAC helpers for role-based route guarding.

use tracing::warn;

use cinema_core::error::AppError;
use cinema_core::types::UserId;

use crate::extractors::Caller;

/// Checks that the caller has the Admin role.
pub fn require_admin(caller: &Caller) -> Result<(), AppError> {
    if !caller.is_admin() {
        warn!(user_id = %caller.user_id, "Admin access denied");
        return Err(AppError::forbidden("Admin access required"));
    }
    Ok(())
}

/// Checks that the caller is `owner` or an admin.
pub fn require_self_or_admin(caller: &Caller, owner: UserId) -> Result<(), AppError> {
    if !caller.can_act_for(owner) {
        warn!(user_id = %caller.user_id, owner = %owner, "Access to another user's data denied");
        return Err(AppError::forbidden(
            "You can only access your own reservations",
        ));
    }
    Ok(())
}
