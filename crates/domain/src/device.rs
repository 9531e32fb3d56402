//! Trusted devices and device invitations.
//!
//! A trusted device grants a staff member expedited re-authentication (PIN or
//! stored biometric credential) on one physical device. Devices are bound
//! through a short-lived, human-enterable numeric invitation code issued by
//! an admin.

use std::str::FromStr;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StaffId;

/// Length of the numeric invitation code.
pub const INVITATION_CODE_LENGTH: usize = 8;

/// Default invitation validity window in days.
pub const DEFAULT_INVITATION_EXPIRY_DAYS: i64 = 7;

/// Validity window for a registered trusted device in days. Expired devices
/// must be re-registered through a fresh invitation.
pub const TRUSTED_DEVICE_EXPIRY_DAYS: i64 = 90;

/// Unique identifier for a trusted device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrustedDeviceId(Uuid);

impl TrustedDeviceId {
    /// Creates a new random device identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a device identifier from an existing UUID value.
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

impl Default for TrustedDeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrustedDeviceId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a device invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInvitationId(Uuid);

impl DeviceInvitationId {
    /// Creates a new random invitation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an invitation identifier from an existing UUID value.
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

impl Default for DeviceInvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeviceInvitationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of a device invitation.
///
/// `Pending -> Used` happens at most once and never reverses. `Expired` may
/// be stamped by a cleanup pass; a pending invitation past its wall-clock
/// expiry is equally invalid even before any stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Issued, not yet redeemed.
    Pending,
    /// Redeemed by exactly one device.
    Used,
    /// Explicitly marked expired.
    Expired,
}

impl InvitationStatus {
    /// Returns the stable storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Used => "used",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "used" => Ok(Self::Used),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown invitation status '{value}'"
            ))),
        }
    }
}

/// Short-lived one-time code binding an unregistered device to a staff profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInvitation {
    /// Unique invitation identifier.
    pub id: DeviceInvitationId,
    /// Organization that issued the invitation.
    pub organization_id: OrganizationId,
    /// Staff profile the redeemed device will be bound to.
    pub staff_id: StaffId,
    /// Fixed-length numeric code, unique among non-expired invitations.
    pub code: String,
    /// Lifecycle state.
    pub status: InvitationStatus,
    /// When the invitation was issued.
    pub created_at: DateTime<Utc>,
    /// Wall-clock expiry.
    pub expires_at: DateTime<Utc>,
    /// When the invitation was redeemed, if ever.
    pub used_at: Option<DateTime<Utc>>,
    /// Fingerprint digest of the redeeming device, if redeemed.
    pub used_by_fingerprint: Option<String>,
}

/// Reason an invitation failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationError {
    /// The invitation has already been redeemed.
    AlreadyUsed,
    /// The invitation expired, either by stamp or by wall clock.
    Expired,
}

impl InvitationError {
    /// Returns a user-facing message for this reason.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyUsed => "this invitation code has already been used",
            Self::Expired => "this invitation code has expired",
        }
    }
}

/// Outcome of validating an invitation. A typed result, never an exception,
/// so callers can render a specific message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationValidation {
    /// Whether the invitation can still be redeemed.
    pub is_valid: bool,
    /// Failure reason when invalid.
    pub error: Option<InvitationError>,
}

impl InvitationValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: InvitationError) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
        }
    }
}

/// Validates an invitation against the given instant.
///
/// Deterministic check order: a used invitation reports `AlreadyUsed` even if
/// its expiry has not passed; an explicit expired stamp reports `Expired`;
/// otherwise the wall clock decides.
#[must_use]
pub fn validate_invitation(
    invitation: &DeviceInvitation,
    now: DateTime<Utc>,
) -> InvitationValidation {
    match invitation.status {
        InvitationStatus::Used => InvitationValidation::invalid(InvitationError::AlreadyUsed),
        InvitationStatus::Expired => InvitationValidation::invalid(InvitationError::Expired),
        InvitationStatus::Pending => {
            if now >= invitation.expires_at {
                InvitationValidation::invalid(InvitationError::Expired)
            } else {
                InvitationValidation::valid()
            }
        }
    }
}

/// Device granted expedited re-authentication for one staff profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedDevice {
    /// Unique device record identifier.
    pub id: TrustedDeviceId,
    /// Staff profile the device is bound to.
    pub staff_id: StaffId,
    /// Organization scope, denormalized for tenant-filtered listings.
    pub organization_id: OrganizationId,
    /// SHA-256 digest of the device fingerprint. Raw fingerprints are never
    /// persisted.
    pub fingerprint_digest: String,
    /// Argon2 hash of the device PIN, when PIN login is enabled.
    pub pin_hash: Option<String>,
    /// Opaque platform biometric credential id, when enrolled.
    pub biometric_credential_id: Option<String>,
    /// Last successful expedited login through this device.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Device trust expiry; past this instant the device must re-register.
    pub expires_at: DateTime<Utc>,
}

impl TrustedDevice {
    /// Returns whether the device trust is still within its validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
