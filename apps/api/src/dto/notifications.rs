use bloomconnect_domain::Notification;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for publishing a notification.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/publish-notification-request.ts"
)]
pub struct PublishNotificationRequest {
    pub title: String,
    pub body: String,
    /// Role to target; omitted reaches every role.
    pub target_role: Option<String>,
}

/// API representation of a notification.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/notification-response.ts"
)]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub target_role: Option<String>,
    pub created_at: String,
    pub created_by: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.title,
            body: notification.body,
            target_role: notification
                .target_role
                .map(|role| role.as_str().to_owned()),
            created_at: notification.created_at.to_rfc3339(),
            created_by: notification.created_by.to_string(),
        }
    }
}
