use std::sync::Arc;

use bloomconnect_application::{
    AuditService, AuthEventService, AuthService, ClientService, DeviceInvitationService,
    FeatureFlagService, NotificationService, OrganizationRepository, OrganizationService,
    RateLimitService, StaffRepository, StaffService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub staff_service: StaffService,
    pub client_service: ClientService,
    pub organization_service: OrganizationService,
    pub device_invitation_service: DeviceInvitationService,
    pub notification_service: NotificationService,
    pub feature_flag_service: FeatureFlagService,
    pub audit_service: AuditService,
    pub auth_event_service: AuthEventService,
    pub rate_limit_service: RateLimitService,
    pub staff_repository: Arc<dyn StaffRepository>,
    pub organization_repository: Arc<dyn OrganizationRepository>,
    pub frontend_url: String,
}
