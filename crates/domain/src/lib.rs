//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod client;
mod device;
mod feature_flag;
mod notification;
mod organization;
mod staff;

pub use access::{
    CHANGE_PASSWORD_PATH, DEFAULT_LANDING_PATH, LOGIN_PATH, can_access_path, is_public_path,
};
pub use audit::AuditAction;
pub use client::{Client, ClientId};
pub use device::{
    DEFAULT_INVITATION_EXPIRY_DAYS, DeviceInvitation, DeviceInvitationId, INVITATION_CODE_LENGTH,
    InvitationError, InvitationStatus, InvitationValidation, TRUSTED_DEVICE_EXPIRY_DAYS,
    TrustedDevice, TrustedDeviceId, validate_invitation,
};
pub use feature_flag::{FeatureFlag, RolloutState};
pub use notification::{Notification, NotificationId};
pub use organization::{Organization, OrganizationCode, PlanTier};
pub use staff::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, StaffId, StaffNumber, StaffProfile,
    StaffRole, validate_password,
};
