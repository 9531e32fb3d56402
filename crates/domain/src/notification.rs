use bloomconnect_core::OrganizationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{StaffId, StaffRole};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// An announcement published to staff within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Short headline.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Role the notification targets. `None` reaches every role.
    pub target_role: Option<StaffRole>,
    /// When the notification was published.
    pub created_at: DateTime<Utc>,
    /// Staff member who published it.
    pub created_by: StaffId,
}

impl Notification {
    /// Returns whether the notification is visible to the given role.
    #[must_use]
    pub fn is_visible_to(&self, role: StaffRole) -> bool {
        self.target_role.is_none_or(|target| target == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification_for(target_role: Option<StaffRole>) -> Notification {
        Notification {
            id: NotificationId::new(),
            organization_id: OrganizationId::new(),
            title: "Shift change".to_owned(),
            body: "The night rota starts at 21:00 from Monday.".to_owned(),
            target_role,
            created_at: Utc::now(),
            created_by: StaffId::new(),
        }
    }

    #[test]
    fn untargeted_notification_reaches_every_role() {
        let notification = notification_for(None);
        for role in StaffRole::all() {
            assert!(notification.is_visible_to(*role));
        }
    }

    #[test]
    fn targeted_notification_reaches_only_that_role() {
        let notification = notification_for(Some(StaffRole::Admin));
        assert!(notification.is_visible_to(StaffRole::Admin));
        assert!(!notification.is_visible_to(StaffRole::Staff));
    }
}
