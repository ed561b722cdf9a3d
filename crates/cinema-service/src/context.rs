//! Request context carrying the calling user and their role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cinema_core::types::UserId;
use cinema_entity::user::UserRole;

/// Context for the current request.
///
/// Built by the HTTP layer from the identity forwarded by the
/// authentication gateway and used to gate access to reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The calling user's ID.
    pub user_id: UserId,
    /// The caller's role.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns whether the caller is `user_id` or an admin.
    pub fn can_act_for(&self, user_id: UserId) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_act_for() {
        let user = RequestContext::new(UserId::new(1), UserRole::User);
        assert!(user.can_act_for(UserId::new(1)));
        assert!(!user.can_act_for(UserId::new(2)));
        assert!(!user.is_admin());

        let admin = RequestContext::new(UserId::new(9), UserRole::Admin);
        assert!(admin.can_act_for(UserId::new(2)));
        assert!(admin.is_admin());
    }
}
