//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_service;
mod auth_event_service;
mod auth_service;
mod client_service;
mod device_invitation_service;
mod feature_flag_service;
mod notification_service;
mod organization_service;
mod rate_limit_service;
mod route_guard;
mod session_service;
mod staff_service;

pub use audit_service::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository, AuditService,
};
pub use auth_event_service::{AuthEvent, AuthEventRepository, AuthEventService};
pub use auth_service::{
    AuthOutcome, AuthService, PasswordHasher, ProvisionStaffParams, StaffCredentials,
    StaffRepository,
};
pub use client_service::{ClientInput, ClientRepository, ClientService, ClientUpdate};
pub use device_invitation_service::{
    DeviceInvitationRepository, DeviceInvitationService, DeviceRegistration,
    MAX_CODE_GENERATION_ATTEMPTS, TrustedDeviceRepository, fingerprint_digest,
};
pub use feature_flag_service::{FeatureFlagRepository, FeatureFlagService};
pub use notification_service::{
    EmailService, NotificationRepository, NotificationService, PublishNotificationParams,
};
pub use organization_service::{OnboardOrganizationParams, OrganizationRepository, OrganizationService};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use route_guard::{RouteDecision, decide_route, post_login_path};
pub use session_service::{SessionService, SessionSnapshot};
pub use staff_service::{StaffService, StaffUpdate};
