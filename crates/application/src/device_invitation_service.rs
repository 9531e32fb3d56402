//! Device invitation issuance and redemption.
//!
//! Admins issue short-lived numeric codes; an unregistered device redeems a
//! code exactly once and becomes a trusted device bound to one staff profile.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{
    AuditAction, DEFAULT_INVITATION_EXPIRY_DAYS, DeviceInvitation, DeviceInvitationId,
    INVITATION_CODE_LENGTH, InvitationStatus, InvitationValidation, StaffId,
    TRUSTED_DEVICE_EXPIRY_DAYS, TrustedDevice, TrustedDeviceId, validate_invitation,
};

use crate::{AuditEvent, AuditService, PasswordHasher, StaffRepository};

/// Maximum attempts to generate a code that is unique among non-expired
/// invitations before the operation gives up.
pub const MAX_CODE_GENERATION_ATTEMPTS: usize = 5;

/// Returns the hex-encoded SHA-256 digest of a raw device fingerprint.
///
/// Raw fingerprints never reach storage; lookups and uniqueness all go
/// through this digest.
#[must_use]
pub fn fingerprint_digest(fingerprint: &str) -> String {
    use std::fmt::Write as _;

    let digest = Sha256::digest(fingerprint.as_bytes());
    let mut encoded = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(encoded, "{byte:02x}");
    }
    encoded
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for device invitation persistence.
#[async_trait]
pub trait DeviceInvitationRepository: Send + Sync {
    /// Persists a freshly issued invitation.
    async fn insert(&self, invitation: &DeviceInvitation) -> AppResult<()>;

    /// Finds an invitation by its numeric code.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<DeviceInvitation>>;

    /// Returns whether a pending, unexpired invitation with this code exists
    /// in any organization.
    async fn active_code_exists(&self, code: &str) -> AppResult<bool>;

    /// Stamps an invitation as used.
    ///
    /// Implementations must only stamp invitations still in the pending
    /// state and return `AppError::Conflict` otherwise, so a concurrent
    /// second redemption never re-stamps `used_at`.
    async fn mark_used(
        &self,
        invitation_id: DeviceInvitationId,
        used_at: DateTime<Utc>,
        used_by_fingerprint: &str,
    ) -> AppResult<()>;

    /// Lists invitations issued by an organization, newest first.
    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<DeviceInvitation>>;

    /// Stamps pending invitations whose expiry has passed. Returns the number
    /// of invitations stamped.
    async fn mark_expired_before(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Repository port for trusted device persistence.
#[async_trait]
pub trait TrustedDeviceRepository: Send + Sync {
    /// Finds a device by its fingerprint digest.
    async fn find_by_fingerprint_digest(&self, digest: &str) -> AppResult<Option<TrustedDevice>>;

    /// Persists a newly registered device.
    async fn register(&self, device: &TrustedDevice) -> AppResult<()>;

    /// Stamps the last successful expedited login through a device.
    async fn record_login(&self, device_id: TrustedDeviceId, at: DateTime<Utc>) -> AppResult<()>;

    /// Removes a device registration.
    async fn revoke(&self, device_id: TrustedDeviceId) -> AppResult<()>;

    /// Lists devices bound to one staff profile.
    async fn list_for_staff(&self, staff_id: StaffId) -> AppResult<Vec<TrustedDevice>>;

    /// Lists devices across an organization for the admin device screen.
    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<TrustedDevice>>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Credentials supplied by a device redeeming an invitation.
pub struct DeviceRegistration {
    /// The numeric invitation code as entered.
    pub code: String,
    /// Raw device fingerprint from the client.
    pub fingerprint: String,
    /// PIN to enroll for expedited login, if chosen.
    pub pin: Option<String>,
    /// Platform biometric credential id to enroll, if chosen.
    pub biometric_credential_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for device invitations and trusted devices.
#[derive(Clone)]
pub struct DeviceInvitationService {
    invitation_repository: Arc<dyn DeviceInvitationRepository>,
    trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
    staff_repository: Arc<dyn StaffRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_service: AuditService,
}

impl DeviceInvitationService {
    /// Creates a new device invitation service.
    #[must_use]
    pub fn new(
        invitation_repository: Arc<dyn DeviceInvitationRepository>,
        trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
        staff_repository: Arc<dyn StaffRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_service: AuditService,
    ) -> Self {
        Self {
            invitation_repository,
            trusted_device_repository,
            staff_repository,
            password_hasher,
            audit_service,
        }
    }

    /// Issues a new invitation for the given staff member.
    ///
    /// Retries code generation until the code is unique among non-expired
    /// invitations, giving up with a conflict after
    /// [`MAX_CODE_GENERATION_ATTEMPTS`] tries.
    pub async fn create_invitation(
        &self,
        organization_id: OrganizationId,
        staff_id: StaffId,
        acting_subject: &str,
    ) -> AppResult<DeviceInvitation> {
        let profile = self
            .staff_repository
            .find_profile(staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound("staff member not found".to_owned()))?;

        if profile.organization_id != organization_id {
            return Err(AppError::Forbidden(
                "staff member belongs to a different organization".to_owned(),
            ));
        }

        if !profile.is_active {
            return Err(AppError::Validation(
                "cannot invite a device for a retired staff member".to_owned(),
            ));
        }

        let mut code = None;
        for _ in 0..MAX_CODE_GENERATION_ATTEMPTS {
            let candidate = generate_invitation_code()?;
            if !self.invitation_repository.active_code_exists(&candidate).await? {
                code = Some(candidate);
                break;
            }
        }
        let Some(code) = code else {
            return Err(AppError::Conflict(
                "failed to generate a unique invitation code, please retry".to_owned(),
            ));
        };

        let now = Utc::now();
        let invitation = DeviceInvitation {
            id: DeviceInvitationId::new(),
            organization_id,
            staff_id,
            code,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(DEFAULT_INVITATION_EXPIRY_DAYS),
            used_at: None,
            used_by_fingerprint: None,
        };

        self.invitation_repository.insert(&invitation).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::DeviceInvitationCreated,
                resource_type: "device_invitation".to_owned(),
                resource_id: invitation.id.to_string(),
                detail: Some(format!("staff_id={staff_id}")),
            })
            .await?;

        Ok(invitation)
    }

    /// Checks a code without redeeming it, returning the typed verdict the
    /// redemption screen renders.
    pub async fn validate_code(&self, code: &str) -> AppResult<InvitationValidation> {
        let invitation = self
            .invitation_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("invitation code not found".to_owned()))?;

        Ok(validate_invitation(&invitation, Utc::now()))
    }

    /// Redeems an invitation and registers the device as trusted.
    ///
    /// The invitation is stamped used before the device record is written;
    /// a code that was already used or has expired fails with the exact
    /// reason so the screen can say which.
    pub async fn redeem_invitation(
        &self,
        registration: DeviceRegistration,
    ) -> AppResult<TrustedDevice> {
        if registration.pin.is_none() && registration.biometric_credential_id.is_none() {
            return Err(AppError::Validation(
                "a PIN or a biometric credential is required to register a device".to_owned(),
            ));
        }

        if let Some(ref pin) = registration.pin {
            validate_pin(pin)?;
        }

        let invitation = self
            .invitation_repository
            .find_by_code(&registration.code)
            .await?
            .ok_or_else(|| AppError::NotFound("invitation code not found".to_owned()))?;

        let now = Utc::now();
        let verdict = validate_invitation(&invitation, now);
        if let Some(error) = verdict.error {
            return Err(AppError::Validation(error.message().to_owned()));
        }

        let digest = fingerprint_digest(&registration.fingerprint);

        let existing = self
            .trusted_device_repository
            .find_by_fingerprint_digest(&digest)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "this device is already registered".to_owned(),
            ));
        }

        self.invitation_repository
            .mark_used(invitation.id, now, &digest)
            .await?;

        let pin_hash = match registration.pin {
            Some(ref pin) => Some(self.password_hasher.hash_password(pin)?),
            None => None,
        };

        let device = TrustedDevice {
            id: TrustedDeviceId::new(),
            staff_id: invitation.staff_id,
            organization_id: invitation.organization_id,
            fingerprint_digest: digest,
            pin_hash,
            biometric_credential_id: registration.biometric_credential_id,
            last_used_at: None,
            expires_at: now + Duration::days(TRUSTED_DEVICE_EXPIRY_DAYS),
        };

        self.trusted_device_repository.register(&device).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id: invitation.organization_id,
                subject: invitation.staff_id.to_string(),
                action: AuditAction::DeviceInvitationRedeemed,
                resource_type: "device_invitation".to_owned(),
                resource_id: invitation.id.to_string(),
                detail: None,
            })
            .await?;

        Ok(device)
    }

    /// Removes a trusted device registration.
    pub async fn revoke_device(
        &self,
        organization_id: OrganizationId,
        device_id: TrustedDeviceId,
        acting_subject: &str,
    ) -> AppResult<()> {
        self.trusted_device_repository.revoke(device_id).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::TrustedDeviceRevoked,
                resource_type: "trusted_device".to_owned(),
                resource_id: device_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(())
    }

    /// Lists invitations issued by an organization.
    pub async fn list_invitations(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<DeviceInvitation>> {
        self.invitation_repository
            .list_for_organization(organization_id)
            .await
    }

    /// Lists trusted devices across an organization.
    pub async fn list_devices(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<TrustedDevice>> {
        self.trusted_device_repository
            .list_for_organization(organization_id)
            .await
    }

    /// Stamps pending invitations past their expiry. Intended for periodic
    /// cleanup; wall-clock validation does not depend on it.
    pub async fn expire_stale_invitations(&self) -> AppResult<u64> {
        self.invitation_repository.mark_expired_before(Utc::now()).await
    }
}

/// Generates a zero-padded numeric invitation code from OS randomness.
fn generate_invitation_code() -> AppResult<String> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to read os randomness: {error}")))?;
    let value = u32::from_be_bytes(bytes) % 100_000_000;
    Ok(format!("{value:0width$}", width = INVITATION_CODE_LENGTH))
}

/// Validates a device PIN: four to eight ASCII digits.
fn validate_pin(pin: &str) -> AppResult<()> {
    if pin.len() < 4 || pin.len() > 8 || !pin.chars().all(|character| character.is_ascii_digit()) {
        return Err(AppError::Validation(
            "PIN must be between 4 and 8 digits".to_owned(),
        ));
    }
    Ok(())
}
