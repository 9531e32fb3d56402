//! Notification publishing and delivery.
//!
//! Notifications land on the in-app notification screen; email fan-out to
//! the targeted staff members is best-effort and never fails the publish.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{AuditAction, Notification, NotificationId, StaffId, StaffRole};

use crate::{AuditEvent, AuditService, StaffRepository};

/// Port for sending email.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// Repository port for notification persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persists a published notification.
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Finds a notification by its identifier.
    async fn find_by_id(&self, notification_id: NotificationId)
    -> AppResult<Option<Notification>>;

    /// Lists notifications for an organization, newest first.
    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Notification>>;

    /// Removes a notification.
    async fn delete(&self, notification_id: NotificationId) -> AppResult<()>;
}

/// Parameters for publishing a notification.
pub struct PublishNotificationParams {
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Short headline.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Role the notification targets. `None` reaches every role.
    pub target_role: Option<StaffRole>,
    /// Staff member publishing it.
    pub created_by: StaffId,
}

/// Application service for notifications.
#[derive(Clone)]
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    staff_repository: Arc<dyn StaffRepository>,
    email_service: Arc<dyn EmailService>,
    audit_service: AuditService,
}

impl NotificationService {
    /// Creates a new notification service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        staff_repository: Arc<dyn StaffRepository>,
        email_service: Arc<dyn EmailService>,
        audit_service: AuditService,
    ) -> Self {
        Self {
            repository,
            staff_repository,
            email_service,
            audit_service,
        }
    }

    /// Publishes a notification and fans out email to the targeted staff.
    ///
    /// A failed email send is logged and skipped; the notification itself is
    /// already persisted and visible in-app.
    pub async fn publish(&self, params: PublishNotificationParams) -> AppResult<Notification> {
        let title = params.title.trim().to_owned();
        if title.is_empty() {
            return Err(AppError::Validation(
                "notification title must not be empty".to_owned(),
            ));
        }
        if params.body.trim().is_empty() {
            return Err(AppError::Validation(
                "notification body must not be empty".to_owned(),
            ));
        }

        let notification = Notification {
            id: NotificationId::new(),
            organization_id: params.organization_id,
            title,
            body: params.body,
            target_role: params.target_role,
            created_at: Utc::now(),
            created_by: params.created_by,
        };

        self.repository.insert(&notification).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id: params.organization_id,
                subject: params.created_by.to_string(),
                action: AuditAction::NotificationPublished,
                resource_type: "notification".to_owned(),
                resource_id: notification.id.to_string(),
                detail: params
                    .target_role
                    .map(|role| format!("target_role={}", role.as_str())),
            })
            .await?;

        let recipients = self
            .staff_repository
            .list_for_organization(params.organization_id)
            .await?;

        for recipient in recipients {
            if !recipient.is_active || !notification.is_visible_to(recipient.role) {
                continue;
            }

            let send = self
                .email_service
                .send_email(
                    recipient.email.as_str(),
                    &notification.title,
                    &notification.body,
                    None,
                )
                .await;

            if let Err(error) = send {
                warn!(
                    notification_id = %notification.id,
                    recipient = %recipient.id,
                    "failed to send notification email: {error}"
                );
            }
        }

        Ok(notification)
    }

    /// Lists notifications visible to the given role, newest first.
    pub async fn list_visible(
        &self,
        organization_id: OrganizationId,
        role: StaffRole,
    ) -> AppResult<Vec<Notification>> {
        let notifications = self.repository.list_for_organization(organization_id).await?;
        Ok(notifications
            .into_iter()
            .filter(|notification| notification.is_visible_to(role))
            .collect())
    }

    /// Removes a notification, scoped to the caller's organization.
    pub async fn delete(
        &self,
        organization_id: OrganizationId,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let notification = self
            .repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("notification not found".to_owned()))?;

        if notification.organization_id != organization_id {
            return Err(AppError::NotFound("notification not found".to_owned()));
        }

        self.repository.delete(notification_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bloomconnect_domain::{EmailAddress, StaffNumber, StaffProfile};
    use chrono::DateTime;

    use super::*;
    use crate::{
        AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository, StaffCredentials,
    };

    struct FakeNotificationRepository {
        notifications: Mutex<Vec<Notification>>,
    }

    impl FakeNotificationRepository {
        fn new() -> Self {
            Self {
                notifications: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationRepository for FakeNotificationRepository {
        async fn insert(&self, notification: &Notification) -> AppResult<()> {
            let mut notifications = self
                .notifications
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            notifications.push(notification.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            notification_id: NotificationId,
        ) -> AppResult<Option<Notification>> {
            let notifications = self
                .notifications
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(notifications
                .iter()
                .find(|notification| notification.id == notification_id)
                .cloned())
        }

        async fn list_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Vec<Notification>> {
            let notifications = self
                .notifications
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(notifications
                .iter()
                .filter(|notification| notification.organization_id == organization_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, notification_id: NotificationId) -> AppResult<()> {
            let mut notifications = self
                .notifications
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            notifications.retain(|notification| notification.id != notification_id);
            Ok(())
        }
    }

    struct FakeStaffRepository {
        profiles: Vec<StaffProfile>,
    }

    #[async_trait]
    impl StaffRepository for FakeStaffRepository {
        async fn find_profile(&self, staff_id: StaffId) -> AppResult<Option<StaffProfile>> {
            Ok(self
                .profiles
                .iter()
                .find(|profile| profile.id == staff_id)
                .cloned())
        }

        async fn find_profile_by_email(
            &self,
            _organization_id: OrganizationId,
            _email: &str,
        ) -> AppResult<Option<StaffProfile>> {
            Ok(None)
        }

        async fn find_credentials(
            &self,
            _staff_id: StaffId,
        ) -> AppResult<Option<StaffCredentials>> {
            Ok(None)
        }

        async fn create(&self, _profile: &StaffProfile, _password_hash: &str) -> AppResult<()> {
            Ok(())
        }

        async fn update_profile(&self, _profile: &StaffProfile) -> AppResult<()> {
            Ok(())
        }

        async fn update_password(
            &self,
            _staff_id: StaffId,
            _password_hash: &str,
            _password_setup_completed: bool,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn record_failed_login(&self, _staff_id: StaffId) -> AppResult<()> {
            Ok(())
        }

        async fn reset_failed_logins(&self, _staff_id: StaffId) -> AppResult<()> {
            Ok(())
        }

        async fn retire(
            &self,
            _staff_id: StaffId,
            _retired_at: DateTime<Utc>,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn list_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Vec<StaffProfile>> {
            Ok(self
                .profiles
                .iter()
                .filter(|profile| profile.organization_id == organization_id)
                .cloned()
                .collect())
        }

        async fn count_active_for_organization(
            &self,
            _organization_id: OrganizationId,
        ) -> AppResult<i64> {
            Ok(0)
        }
    }

    struct RecordingEmailService {
        sent_to: Mutex<Vec<String>>,
    }

    impl RecordingEmailService {
        fn new() -> Self {
            Self {
                sent_to: Mutex::new(Vec::new()),
            }
        }

        fn recipients(&self) -> Vec<String> {
            self.sent_to.lock().map(|sent| sent.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_email(
            &self,
            to: &str,
            _subject: &str,
            _text_body: &str,
            _html_body: Option<&str>,
        ) -> AppResult<()> {
            let mut sent = self
                .sent_to
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            sent.push(to.to_owned());
            Ok(())
        }
    }

    struct FailingEmailService;

    #[async_trait]
    impl EmailService for FailingEmailService {
        async fn send_email(
            &self,
            _to: &str,
            _subject: &str,
            _text_body: &str,
            _html_body: Option<&str>,
        ) -> AppResult<()> {
            Err(AppError::Internal("smtp unavailable".to_owned()))
        }
    }

    struct NullAuditRepository;

    #[async_trait]
    impl AuditRepository for NullAuditRepository {
        async fn append_event(&self, _event: AuditEvent) -> AppResult<()> {
            Ok(())
        }
    }

    struct NullAuditLogRepository;

    #[async_trait]
    impl AuditLogRepository for NullAuditLogRepository {
        async fn list_recent_entries(
            &self,
            _organization_id: OrganizationId,
            _query: AuditLogQuery,
        ) -> AppResult<Vec<AuditLogEntry>> {
            Ok(Vec::new())
        }
    }

    fn member(
        organization_id: OrganizationId,
        role: StaffRole,
        email: &str,
        is_active: bool,
    ) -> StaffProfile {
        StaffProfile {
            id: StaffId::new(),
            organization_id,
            display_name: "Member".to_owned(),
            role,
            staff_number: StaffNumber::new("0001")
                .unwrap_or_else(|_| panic!("fixture staff number must be valid")),
            email: EmailAddress::new(email)
                .unwrap_or_else(|_| panic!("fixture email must be valid")),
            is_active,
            retired_at: None,
            password_setup_completed: true,
        }
    }

    fn service_with(
        staff: Vec<StaffProfile>,
        email_service: Arc<dyn EmailService>,
    ) -> NotificationService {
        NotificationService::new(
            Arc::new(FakeNotificationRepository::new()),
            Arc::new(FakeStaffRepository { profiles: staff }),
            email_service,
            AuditService::new(Arc::new(NullAuditRepository), Arc::new(NullAuditLogRepository)),
        )
    }

    #[tokio::test]
    async fn targeted_publish_emails_only_matching_active_staff() {
        let organization_id = OrganizationId::new();
        let admin = member(organization_id, StaffRole::Admin, "admin@bloom-care.jp", true);
        let staff = member(organization_id, StaffRole::Staff, "staff@bloom-care.jp", true);
        let retired_admin = member(
            organization_id,
            StaffRole::Admin,
            "retired@bloom-care.jp",
            false,
        );
        let emails = Arc::new(RecordingEmailService::new());
        let service = service_with(
            vec![admin, staff, retired_admin],
            Arc::clone(&emails) as Arc<dyn EmailService>,
        );

        let published = service
            .publish(PublishNotificationParams {
                organization_id,
                title: "Plan review".to_owned(),
                body: "Care plan review meets Thursday.".to_owned(),
                target_role: Some(StaffRole::Admin),
                created_by: StaffId::new(),
            })
            .await;

        assert!(published.is_ok());
        assert_eq!(emails.recipients(), vec!["admin@bloom-care.jp".to_owned()]);
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_the_publish() {
        let organization_id = OrganizationId::new();
        let staff = member(organization_id, StaffRole::Staff, "staff@bloom-care.jp", true);
        let service = service_with(vec![staff], Arc::new(FailingEmailService));

        let published = service
            .publish(PublishNotificationParams {
                organization_id,
                title: "Shift change".to_owned(),
                body: "Night rota starts at 21:00.".to_owned(),
                target_role: None,
                created_by: StaffId::new(),
            })
            .await;

        assert!(published.is_ok());
    }

    #[tokio::test]
    async fn listing_filters_by_role_visibility() {
        let organization_id = OrganizationId::new();
        let service = service_with(Vec::new(), Arc::new(RecordingEmailService::new()));

        let all_roles = service
            .publish(PublishNotificationParams {
                organization_id,
                title: "All hands".to_owned(),
                body: "Everyone please read.".to_owned(),
                target_role: None,
                created_by: StaffId::new(),
            })
            .await;
        let admins_only = service
            .publish(PublishNotificationParams {
                organization_id,
                title: "Admin only".to_owned(),
                body: "Budget figures attached.".to_owned(),
                target_role: Some(StaffRole::Admin),
                created_by: StaffId::new(),
            })
            .await;
        assert!(all_roles.is_ok() && admins_only.is_ok());

        let for_staff = service.list_visible(organization_id, StaffRole::Staff).await;
        assert!(matches!(for_staff, Ok(ref visible) if visible.len() == 1));

        let for_admins = service.list_visible(organization_id, StaffRole::Admin).await;
        assert!(matches!(for_admins, Ok(ref visible) if visible.len() == 2));
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let organization_id = OrganizationId::new();
        let service = service_with(Vec::new(), Arc::new(RecordingEmailService::new()));

        let result = service
            .publish(PublishNotificationParams {
                organization_id,
                title: "  ".to_owned(),
                body: "body".to_owned(),
                target_role: None,
                created_by: StaffId::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
