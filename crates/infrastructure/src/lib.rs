//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_auth_event_repository;
mod postgres_client_repository;
mod postgres_device_invitation_repository;
mod postgres_feature_flag_repository;
mod postgres_notification_repository;
mod postgres_organization_repository;
mod postgres_rate_limit_repository;
mod postgres_staff_repository;
mod postgres_trusted_device_repository;
mod smtp_email_service;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_auth_event_repository::PostgresAuthEventRepository;
pub use postgres_client_repository::PostgresClientRepository;
pub use postgres_device_invitation_repository::PostgresDeviceInvitationRepository;
pub use postgres_feature_flag_repository::PostgresFeatureFlagRepository;
pub use postgres_notification_repository::PostgresNotificationRepository;
pub use postgres_organization_repository::PostgresOrganizationRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_staff_repository::PostgresStaffRepository;
pub use postgres_trusted_device_repository::PostgresTrustedDeviceRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
