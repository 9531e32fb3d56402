//! Staff authentication ports and application service.
//!
//! Owns password login, device-bound expedited login, staff provisioning,
//! and password changes. Follows OWASP guidelines for generic error
//! messages and hash-on-miss timing defenses.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bloomconnect_core::{AppError, AppResult, Identity, OrganizationId};
use bloomconnect_domain::{
    EmailAddress, OrganizationCode, StaffId, StaffNumber, StaffProfile, StaffRole,
    validate_password,
};

use bloomconnect_domain::AuditAction;

use crate::{
    AuditEvent, AuditService, AuthEvent, AuthEventService, OrganizationRepository,
    TrustedDeviceRepository, fingerprint_digest,
};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Credential record backing password login, kept separate from the profile
/// so that listing screens never touch password material.
#[derive(Debug, Clone)]
pub struct StaffCredentials {
    /// Staff member the credentials belong to.
    pub staff_id: StaffId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Number of consecutive failed login attempts.
    pub failed_login_count: i32,
    /// Account is locked until this time, if set.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Repository port for staff profile and credential persistence.
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Finds a staff profile by its identifier.
    async fn find_profile(&self, staff_id: StaffId) -> AppResult<Option<StaffProfile>>;

    /// Finds a staff profile by canonical email within an organization.
    async fn find_profile_by_email(
        &self,
        organization_id: OrganizationId,
        email: &str,
    ) -> AppResult<Option<StaffProfile>>;

    /// Finds login credentials by staff identifier.
    async fn find_credentials(&self, staff_id: StaffId) -> AppResult<Option<StaffCredentials>>;

    /// Creates a profile together with its initial password hash.
    async fn create(&self, profile: &StaffProfile, password_hash: &str) -> AppResult<()>;

    /// Updates the mutable profile fields.
    async fn update_profile(&self, profile: &StaffProfile) -> AppResult<()>;

    /// Replaces the password hash and records whether initial password setup
    /// is now complete.
    async fn update_password(
        &self,
        staff_id: StaffId,
        password_hash: &str,
        password_setup_completed: bool,
    ) -> AppResult<()>;

    /// Increments the failed login counter and optionally locks the account.
    async fn record_failed_login(&self, staff_id: StaffId) -> AppResult<()>;

    /// Resets the failed login counter and removes any account lock.
    async fn reset_failed_logins(&self, staff_id: StaffId) -> AppResult<()>;

    /// Retires a profile: clears `is_active` and stamps the retirement time.
    async fn retire(&self, staff_id: StaffId, retired_at: DateTime<Utc>) -> AppResult<()>;

    /// Lists all profiles in an organization, active first.
    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<StaffProfile>>;

    /// Counts active profiles in an organization for plan limit checks.
    async fn count_active_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<i64>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling. Also hashes device PINs.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext secret using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext secret against a stored hash.
    /// Must run in constant time regardless of validity.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Authentication outcome
// ---------------------------------------------------------------------------

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated {
        /// Session identity to persist.
        identity: Identity,
        /// Resolved staff profile.
        profile: StaffProfile,
    },
    /// Authentication failed. Generic message prevents enumeration.
    Failed,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for provisioning a staff member.
pub struct ProvisionStaffParams {
    /// Organization the profile joins.
    pub organization_id: OrganizationId,
    /// Display name shown across the application.
    pub display_name: String,
    /// Assigned role.
    pub role: StaffRole,
    /// Badge number.
    pub staff_number: String,
    /// Email address, the password login key.
    pub email: String,
    /// Temporary password the member must replace at first login.
    pub temporary_password: String,
    /// Subject performing the provisioning, for the audit trail.
    pub acting_subject: String,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for staff authentication and provisioning.
#[derive(Clone)]
pub struct AuthService {
    staff_repository: Arc<dyn StaffRepository>,
    organization_repository: Arc<dyn OrganizationRepository>,
    trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    auth_event_service: AuthEventService,
    audit_service: AuditService,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        staff_repository: Arc<dyn StaffRepository>,
        organization_repository: Arc<dyn OrganizationRepository>,
        trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        auth_event_service: AuthEventService,
        audit_service: AuditService,
    ) -> Self {
        Self {
            staff_repository,
            organization_repository,
            trusted_device_repository,
            password_hasher,
            auth_event_service,
            audit_service,
        }
    }

    /// Authenticates a staff member with organization code, email and password.
    ///
    /// Returns `AuthOutcome::Failed` for any failure (unknown organization,
    /// unknown email, wrong password, locked or retired account) so callers
    /// can render one generic message that prevents enumeration.
    pub async fn login(
        &self,
        organization_code: &str,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AuthOutcome> {
        let Ok(code) = OrganizationCode::new(organization_code) else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let organization = self.organization_repository.find_by_code(&code).await?;
        let Some(organization) = organization else {
            // OWASP: always hash to prevent timing attacks even on a miss.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !organization.is_active {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        }

        let canonical_email = match EmailAddress::new(email) {
            Ok(value) => value,
            Err(_) => {
                let _ = self.password_hasher.hash_password(password);
                return Ok(AuthOutcome::Failed);
            }
        };

        let profile = self
            .staff_repository
            .find_profile_by_email(organization.id, canonical_email.as_str())
            .await?;
        let Some(profile) = profile else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !profile.is_active {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        }

        let credentials = self.staff_repository.find_credentials(profile.id).await?;
        let Some(credentials) = credentials else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        // Check account lockout.
        if let Some(locked_until) = credentials.locked_until
            && Utc::now() < locked_until
        {
            // Still locked. Don't reveal this; just say failed.
            let _ = self.password_hasher.hash_password(password);

            self.auth_event_service
                .record_event(AuthEvent {
                    subject: Some(profile.id.to_string()),
                    event_type: "password_login".to_owned(),
                    outcome: "account_locked".to_owned(),
                    ip_address,
                    user_agent,
                })
                .await?;

            return Ok(AuthOutcome::Failed);
        }

        let password_valid = self
            .password_hasher
            .verify_password(password, &credentials.password_hash)?;

        if !password_valid {
            self.staff_repository.record_failed_login(profile.id).await?;

            self.auth_event_service
                .record_event(AuthEvent {
                    subject: Some(profile.id.to_string()),
                    event_type: "password_login".to_owned(),
                    outcome: "invalid_password".to_owned(),
                    ip_address,
                    user_agent,
                })
                .await?;

            return Ok(AuthOutcome::Failed);
        }

        self.staff_repository.reset_failed_logins(profile.id).await?;

        self.auth_event_service
            .record_event(AuthEvent {
                subject: Some(profile.id.to_string()),
                event_type: "password_login".to_owned(),
                outcome: "success".to_owned(),
                ip_address,
                user_agent,
            })
            .await?;

        let identity = identity_for(&profile);
        Ok(AuthOutcome::Authenticated { identity, profile })
    }

    /// Authenticates through a registered trusted device.
    ///
    /// The caller supplies the raw device fingerprint plus either a PIN
    /// (verified against the stored Argon2 hash) or the platform biometric
    /// credential id the device unlocked locally. Failures are generic.
    pub async fn device_login(
        &self,
        fingerprint: &str,
        pin: Option<&str>,
        biometric_credential_id: Option<&str>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AuthOutcome> {
        let digest = fingerprint_digest(fingerprint);
        let device = self
            .trusted_device_repository
            .find_by_fingerprint_digest(&digest)
            .await?;

        let Some(device) = device else {
            if let Some(pin) = pin {
                let _ = self.password_hasher.hash_password(pin);
            }
            return Ok(AuthOutcome::Failed);
        };

        let now = Utc::now();
        if !device.is_valid_at(now) {
            self.auth_event_service
                .record_event(AuthEvent {
                    subject: Some(device.staff_id.to_string()),
                    event_type: "device_login".to_owned(),
                    outcome: "device_expired".to_owned(),
                    ip_address,
                    user_agent,
                })
                .await?;
            return Ok(AuthOutcome::Failed);
        }

        let credential_valid = match (pin, biometric_credential_id) {
            (Some(pin), _) => match device.pin_hash.as_deref() {
                Some(stored_hash) => self.password_hasher.verify_password(pin, stored_hash)?,
                None => {
                    let _ = self.password_hasher.hash_password(pin);
                    false
                }
            },
            (None, Some(credential_id)) => device
                .biometric_credential_id
                .as_deref()
                .is_some_and(|stored| stored == credential_id),
            (None, None) => false,
        };

        if !credential_valid {
            self.staff_repository
                .record_failed_login(device.staff_id)
                .await?;

            self.auth_event_service
                .record_event(AuthEvent {
                    subject: Some(device.staff_id.to_string()),
                    event_type: "device_login".to_owned(),
                    outcome: "invalid_credential".to_owned(),
                    ip_address,
                    user_agent,
                })
                .await?;

            return Ok(AuthOutcome::Failed);
        }

        let profile = self.staff_repository.find_profile(device.staff_id).await?;
        let Some(profile) = profile else {
            return Ok(AuthOutcome::Failed);
        };

        if !profile.is_active {
            return Ok(AuthOutcome::Failed);
        }

        self.staff_repository
            .reset_failed_logins(profile.id)
            .await?;
        self.trusted_device_repository
            .record_login(device.id, now)
            .await?;

        self.auth_event_service
            .record_event(AuthEvent {
                subject: Some(profile.id.to_string()),
                event_type: "device_login".to_owned(),
                outcome: "success".to_owned(),
                ip_address,
                user_agent,
            })
            .await?;

        let identity = identity_for(&profile);
        Ok(AuthOutcome::Authenticated { identity, profile })
    }

    /// Provisions a staff member with a temporary password.
    ///
    /// Enforces the organization's plan staff limit against active profiles
    /// and rejects duplicate email addresses within the organization. The
    /// member logs in with the temporary password and is forced through the
    /// password change screen before anything else.
    pub async fn provision_staff(&self, params: ProvisionStaffParams) -> AppResult<StaffProfile> {
        let organization = self
            .organization_repository
            .find_by_id(params.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("organization not found".to_owned()))?;

        if !organization.is_active {
            return Err(AppError::Forbidden(
                "organization is deactivated".to_owned(),
            ));
        }

        let email = EmailAddress::new(&params.email)?;
        let staff_number = StaffNumber::new(&params.staff_number)?;
        validate_password(&params.temporary_password)?;

        if params.display_name.trim().is_empty() {
            return Err(AppError::Validation(
                "display name must not be empty".to_owned(),
            ));
        }

        let active_count = self
            .staff_repository
            .count_active_for_organization(organization.id)
            .await?;
        if active_count >= i64::from(organization.staff_limit) {
            return Err(AppError::Forbidden(format!(
                "staff limit of {} reached for this plan",
                organization.staff_limit
            )));
        }

        let existing = self
            .staff_repository
            .find_profile_by_email(organization.id, email.as_str())
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "a staff member with this email already exists".to_owned(),
            ));
        }

        let profile = StaffProfile {
            id: StaffId::new(),
            organization_id: organization.id,
            display_name: params.display_name.trim().to_owned(),
            role: params.role,
            staff_number,
            email,
            is_active: true,
            retired_at: None,
            password_setup_completed: false,
        };

        let password_hash = self.password_hasher.hash_password(&params.temporary_password)?;
        self.staff_repository.create(&profile, &password_hash).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id: organization.id,
                subject: params.acting_subject,
                action: AuditAction::StaffProvisioned,
                resource_type: "staff".to_owned(),
                resource_id: profile.id.to_string(),
                detail: Some(format!("role={}", profile.role.as_str())),
            })
            .await?;

        Ok(profile)
    }

    /// Changes the password for an authenticated staff member.
    ///
    /// Requires the current password for verification and marks initial
    /// password setup as completed, which clears the forced-change redirect.
    pub async fn change_password(
        &self,
        staff_id: StaffId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<Identity> {
        let credentials = self
            .staff_repository
            .find_credentials(staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound("staff member not found".to_owned()))?;

        let current_valid = self
            .password_hasher
            .verify_password(current_password, &credentials.password_hash)?;
        if !current_valid {
            return Err(AppError::Unauthorized(
                "current password is incorrect".to_owned(),
            ));
        }

        validate_password(new_password)?;
        if new_password == current_password {
            return Err(AppError::Validation(
                "new password must differ from the current password".to_owned(),
            ));
        }

        let new_hash = self.password_hasher.hash_password(new_password)?;
        self.staff_repository
            .update_password(staff_id, &new_hash, true)
            .await?;

        let profile = self
            .staff_repository
            .find_profile(staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound("staff member not found".to_owned()))?;

        Ok(identity_for(&profile))
    }

    /// Returns a reference to the password hasher for use by other services.
    #[must_use]
    pub fn password_hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.password_hasher
    }
}

/// Builds the session identity for a staff profile.
#[must_use]
pub(crate) fn identity_for(profile: &StaffProfile) -> Identity {
    Identity::new(
        profile.id.to_string(),
        profile.display_name.clone(),
        Some(profile.email.as_str().to_owned()),
        profile.organization_id,
        profile.role.as_str(),
        profile.must_change_password(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use bloomconnect_domain::{
        Organization, PlanTier, TRUSTED_DEVICE_EXPIRY_DAYS, TrustedDevice, TrustedDeviceId,
    };
    use chrono::Duration;

    use super::*;
    use crate::{AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
    use crate::{AuthEventRepository, OrganizationRepository};

    // -- fakes --------------------------------------------------------------

    struct FakeStaffRepository {
        profiles: Mutex<HashMap<String, StaffProfile>>,
        credentials: Mutex<HashMap<String, StaffCredentials>>,
        failed_logins: Mutex<Vec<String>>,
    }

    impl FakeStaffRepository {
        fn new() -> Self {
            Self {
                profiles: Mutex::new(HashMap::new()),
                credentials: Mutex::new(HashMap::new()),
                failed_logins: Mutex::new(Vec::new()),
            }
        }

        fn with_member(self, profile: StaffProfile, credentials: StaffCredentials) -> Self {
            if let Ok(mut profiles) = self.profiles.lock() {
                profiles.insert(profile.id.to_string(), profile);
            }
            if let Ok(mut stored) = self.credentials.lock() {
                stored.insert(credentials.staff_id.to_string(), credentials);
            }
            self
        }

        fn failed_login_count(&self) -> usize {
            self.failed_logins
                .lock()
                .map(|entries| entries.len())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl StaffRepository for FakeStaffRepository {
        async fn find_profile(&self, staff_id: StaffId) -> AppResult<Option<StaffProfile>> {
            let profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(profiles.get(&staff_id.to_string()).cloned())
        }

        async fn find_profile_by_email(
            &self,
            organization_id: OrganizationId,
            email: &str,
        ) -> AppResult<Option<StaffProfile>> {
            let profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(profiles
                .values()
                .find(|profile| {
                    profile.organization_id == organization_id && profile.email.as_str() == email
                })
                .cloned())
        }

        async fn find_credentials(
            &self,
            staff_id: StaffId,
        ) -> AppResult<Option<StaffCredentials>> {
            let credentials = self
                .credentials
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(credentials.get(&staff_id.to_string()).cloned())
        }

        async fn create(&self, profile: &StaffProfile, password_hash: &str) -> AppResult<()> {
            let mut profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            profiles.insert(profile.id.to_string(), profile.clone());

            let mut credentials = self
                .credentials
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            credentials.insert(
                profile.id.to_string(),
                StaffCredentials {
                    staff_id: profile.id,
                    organization_id: profile.organization_id,
                    password_hash: password_hash.to_owned(),
                    failed_login_count: 0,
                    locked_until: None,
                },
            );
            Ok(())
        }

        async fn update_profile(&self, profile: &StaffProfile) -> AppResult<()> {
            let mut profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            profiles.insert(profile.id.to_string(), profile.clone());
            Ok(())
        }

        async fn update_password(
            &self,
            staff_id: StaffId,
            password_hash: &str,
            password_setup_completed: bool,
        ) -> AppResult<()> {
            let mut credentials = self
                .credentials
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(record) = credentials.get_mut(&staff_id.to_string()) {
                record.password_hash = password_hash.to_owned();
            }

            let mut profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(profile) = profiles.get_mut(&staff_id.to_string()) {
                profile.password_setup_completed = password_setup_completed;
            }
            Ok(())
        }

        async fn record_failed_login(&self, staff_id: StaffId) -> AppResult<()> {
            let mut entries = self
                .failed_logins
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            entries.push(staff_id.to_string());
            Ok(())
        }

        async fn reset_failed_logins(&self, _staff_id: StaffId) -> AppResult<()> {
            Ok(())
        }

        async fn retire(&self, staff_id: StaffId, retired_at: DateTime<Utc>) -> AppResult<()> {
            let mut profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(profile) = profiles.get_mut(&staff_id.to_string()) {
                profile.is_active = false;
                profile.retired_at = Some(retired_at);
            }
            Ok(())
        }

        async fn list_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Vec<StaffProfile>> {
            let profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(profiles
                .values()
                .filter(|profile| profile.organization_id == organization_id)
                .cloned()
                .collect())
        }

        async fn count_active_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<i64> {
            let profiles = self
                .profiles
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(profiles
                .values()
                .filter(|profile| profile.organization_id == organization_id && profile.is_active)
                .count() as i64)
        }
    }

    struct FakeOrganizationRepository {
        organizations: Mutex<Vec<Organization>>,
    }

    impl FakeOrganizationRepository {
        fn with(organization: Organization) -> Self {
            Self {
                organizations: Mutex::new(vec![organization]),
            }
        }
    }

    #[async_trait]
    impl OrganizationRepository for FakeOrganizationRepository {
        async fn find_by_id(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Option<Organization>> {
            let organizations = self
                .organizations
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(organizations
                .iter()
                .find(|organization| organization.id == organization_id)
                .cloned())
        }

        async fn find_by_code(&self, code: &OrganizationCode) -> AppResult<Option<Organization>> {
            let organizations = self
                .organizations
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(organizations
                .iter()
                .find(|organization| organization.code == *code)
                .cloned())
        }

        async fn create(&self, organization: &Organization) -> AppResult<()> {
            let mut organizations = self
                .organizations
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            organizations.push(organization.clone());
            Ok(())
        }

        async fn update(&self, organization: &Organization) -> AppResult<()> {
            let mut organizations = self
                .organizations
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(stored) = organizations
                .iter_mut()
                .find(|stored| stored.id == organization.id)
            {
                *stored = organization.clone();
            }
            Ok(())
        }

        async fn list_all(&self) -> AppResult<Vec<Organization>> {
            let organizations = self
                .organizations
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(organizations.clone())
        }
    }

    struct FakeTrustedDeviceRepository {
        devices: Mutex<Vec<TrustedDevice>>,
    }

    impl FakeTrustedDeviceRepository {
        fn new() -> Self {
            Self {
                devices: Mutex::new(Vec::new()),
            }
        }

        fn with(device: TrustedDevice) -> Self {
            Self {
                devices: Mutex::new(vec![device]),
            }
        }
    }

    #[async_trait]
    impl TrustedDeviceRepository for FakeTrustedDeviceRepository {
        async fn find_by_fingerprint_digest(
            &self,
            digest: &str,
        ) -> AppResult<Option<TrustedDevice>> {
            let devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(devices
                .iter()
                .find(|device| device.fingerprint_digest == digest)
                .cloned())
        }

        async fn register(&self, device: &TrustedDevice) -> AppResult<()> {
            let mut devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            devices.push(device.clone());
            Ok(())
        }

        async fn record_login(&self, device_id: TrustedDeviceId, at: DateTime<Utc>) -> AppResult<()> {
            let mut devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(device) = devices.iter_mut().find(|device| device.id == device_id) {
                device.last_used_at = Some(at);
            }
            Ok(())
        }

        async fn revoke(&self, device_id: TrustedDeviceId) -> AppResult<()> {
            let mut devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            devices.retain(|device| device.id != device_id);
            Ok(())
        }

        async fn list_for_staff(&self, staff_id: StaffId) -> AppResult<Vec<TrustedDevice>> {
            let devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(devices
                .iter()
                .filter(|device| device.staff_id == staff_id)
                .cloned()
                .collect())
        }

        async fn list_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Vec<TrustedDevice>> {
            let devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(devices
                .iter()
                .filter(|device| device.organization_id == organization_id)
                .cloned()
                .collect())
        }
    }

    struct NullAuthEventRepository;

    #[async_trait]
    impl AuthEventRepository for NullAuthEventRepository {
        async fn append_event(&self, _event: AuthEvent) -> AppResult<()> {
            Ok(())
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

    struct FakePasswordHasher;

    #[async_trait]
    impl PasswordHasher for FakePasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    // -- fixtures -----------------------------------------------------------

    fn test_organization() -> Organization {
        Organization {
            id: OrganizationId::new(),
            name: "Bloom Care Sakura".to_owned(),
            code: OrganizationCode::new("sakura01").unwrap_or_else(|_| {
                panic!("fixture organization code must be valid")
            }),
            plan_tier: PlanTier::Standard,
            staff_limit: 50,
            contracted_apps: vec!["connect".to_owned()],
            is_active: true,
        }
    }

    fn test_profile(organization_id: OrganizationId) -> StaffProfile {
        StaffProfile {
            id: StaffId::new(),
            organization_id,
            display_name: "Aiko Tanaka".to_owned(),
            role: StaffRole::Staff,
            staff_number: StaffNumber::new("0042")
                .unwrap_or_else(|_| panic!("fixture staff number must be valid")),
            email: EmailAddress::new("aiko@bloom-care.jp")
                .unwrap_or_else(|_| panic!("fixture email must be valid")),
            is_active: true,
            retired_at: None,
            password_setup_completed: true,
        }
    }

    fn credentials_for(profile: &StaffProfile, password: &str) -> StaffCredentials {
        StaffCredentials {
            staff_id: profile.id,
            organization_id: profile.organization_id,
            password_hash: format!("hashed:{password}"),
            failed_login_count: 0,
            locked_until: None,
        }
    }

    fn service_with(
        staff: FakeStaffRepository,
        organization: Organization,
        devices: FakeTrustedDeviceRepository,
    ) -> (AuthService, Arc<FakeStaffRepository>) {
        let staff = Arc::new(staff);
        let service = AuthService::new(
            Arc::clone(&staff) as Arc<dyn StaffRepository>,
            Arc::new(FakeOrganizationRepository::with(organization)),
            Arc::new(devices),
            Arc::new(FakePasswordHasher),
            AuthEventService::new(Arc::new(NullAuthEventRepository)),
            AuditService::new(Arc::new(NullAuditRepository), Arc::new(NullAuditLogRepository)),
        );
        (service, staff)
    }

    // -- tests --------------------------------------------------------------

    #[tokio::test]
    async fn correct_credentials_authenticate() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "aiko@bloom-care.jp", "a-solid-passphrase", None, None)
            .await;

        assert!(matches!(
            outcome,
            Ok(AuthOutcome::Authenticated { ref identity, .. })
                if identity.subject() == profile.id.to_string()
                    && !identity.must_change_password()
        ));
    }

    #[tokio::test]
    async fn unknown_email_fails_generically() {
        let organization = test_organization();
        let staff = FakeStaffRepository::new();
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "nobody@bloom-care.jp", "whatever-pass", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn unknown_organization_code_fails_generically() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("wrongcode", "aiko@bloom-care.jp", "a-solid-passphrase", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn wrong_password_records_failed_login() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, staff) =
            service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "aiko@bloom-care.jp", "wrong-password", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
        assert_eq!(staff.failed_login_count(), 1);
    }

    #[tokio::test]
    async fn locked_account_fails_even_with_correct_password() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let mut credentials = credentials_for(&profile, "a-solid-passphrase");
        credentials.locked_until = Some(Utc::now() + Duration::minutes(10));
        let staff = FakeStaffRepository::new().with_member(profile, credentials);
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "aiko@bloom-care.jp", "a-solid-passphrase", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn retired_profile_cannot_log_in() {
        let organization = test_organization();
        let mut profile = test_profile(organization.id);
        profile.is_active = false;
        profile.retired_at = Some(Utc::now());
        let credentials = credentials_for(&profile, "a-solid-passphrase");
        let staff = FakeStaffRepository::new().with_member(profile, credentials);
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "aiko@bloom-care.jp", "a-solid-passphrase", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn deactivated_organization_blocks_login() {
        let mut organization = test_organization();
        organization.is_active = false;
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .login("sakura01", "aiko@bloom-care.jp", "a-solid-passphrase", None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn device_login_with_correct_pin_authenticates() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let device = TrustedDevice {
            id: TrustedDeviceId::new(),
            staff_id: profile.id,
            organization_id: organization.id,
            fingerprint_digest: fingerprint_digest("tablet-7f"),
            pin_hash: Some("hashed:482913".to_owned()),
            biometric_credential_id: None,
            last_used_at: None,
            expires_at: Utc::now() + Duration::days(TRUSTED_DEVICE_EXPIRY_DAYS),
        };
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) =
            service_with(staff, organization, FakeTrustedDeviceRepository::with(device));

        let outcome = service
            .device_login("tablet-7f", Some("482913"), None, None, None)
            .await;

        assert!(matches!(
            outcome,
            Ok(AuthOutcome::Authenticated { ref identity, .. })
                if identity.subject() == profile.id.to_string()
        ));
    }

    #[tokio::test]
    async fn device_login_with_expired_device_fails() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let device = TrustedDevice {
            id: TrustedDeviceId::new(),
            staff_id: profile.id,
            organization_id: organization.id,
            fingerprint_digest: fingerprint_digest("tablet-7f"),
            pin_hash: Some("hashed:482913".to_owned()),
            biometric_credential_id: None,
            last_used_at: None,
            expires_at: Utc::now() - Duration::days(1),
        };
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) =
            service_with(staff, organization, FakeTrustedDeviceRepository::with(device));

        let outcome = service
            .device_login("tablet-7f", Some("482913"), None, None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn device_login_with_unknown_fingerprint_fails() {
        let organization = test_organization();
        let staff = FakeStaffRepository::new();
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let outcome = service
            .device_login("never-registered", Some("482913"), None, None, None)
            .await;

        assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
    }

    #[tokio::test]
    async fn provisioning_respects_staff_limit() {
        let mut organization = test_organization();
        organization.staff_limit = 1;
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) =
            service_with(staff, organization.clone(), FakeTrustedDeviceRepository::new());

        let result = service
            .provision_staff(ProvisionStaffParams {
                organization_id: organization.id,
                display_name: "Kenta Mori".to_owned(),
                role: StaffRole::Staff,
                staff_number: "0043".to_owned(),
                email: "kenta@bloom-care.jp".to_owned(),
                temporary_password: "temp-password-42".to_owned(),
                acting_subject: "admin-1".to_owned(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn provisioning_rejects_duplicate_email() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let staff = FakeStaffRepository::new()
            .with_member(profile.clone(), credentials_for(&profile, "a-solid-passphrase"));
        let (service, _) =
            service_with(staff, organization.clone(), FakeTrustedDeviceRepository::new());

        let result = service
            .provision_staff(ProvisionStaffParams {
                organization_id: organization.id,
                display_name: "Aiko Clone".to_owned(),
                role: StaffRole::Staff,
                staff_number: "0099".to_owned(),
                email: "aiko@bloom-care.jp".to_owned(),
                temporary_password: "temp-password-42".to_owned(),
                acting_subject: "admin-1".to_owned(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn provisioned_member_must_change_password() {
        let organization = test_organization();
        let staff = FakeStaffRepository::new();
        let (service, _) =
            service_with(staff, organization.clone(), FakeTrustedDeviceRepository::new());

        let provisioned = service
            .provision_staff(ProvisionStaffParams {
                organization_id: organization.id,
                display_name: "Kenta Mori".to_owned(),
                role: StaffRole::Staff,
                staff_number: "0043".to_owned(),
                email: "kenta@bloom-care.jp".to_owned(),
                temporary_password: "temp-password-42".to_owned(),
                acting_subject: "admin-1".to_owned(),
            })
            .await;

        assert!(matches!(
            provisioned,
            Ok(ref profile) if profile.must_change_password()
        ));
    }

    #[tokio::test]
    async fn change_password_clears_forced_change() {
        let organization = test_organization();
        let mut profile = test_profile(organization.id);
        profile.password_setup_completed = false;
        let credentials = credentials_for(&profile, "temp-password-42");
        let staff_id = profile.id;
        let staff = FakeStaffRepository::new().with_member(profile, credentials);
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let identity = service
            .change_password(staff_id, "temp-password-42", "a-brand-new-passphrase")
            .await;

        assert!(matches!(
            identity,
            Ok(ref identity) if !identity.must_change_password()
        ));
    }

    #[tokio::test]
    async fn change_password_rejects_wrong_current_password() {
        let organization = test_organization();
        let profile = test_profile(organization.id);
        let credentials = credentials_for(&profile, "a-solid-passphrase");
        let staff_id = profile.id;
        let staff = FakeStaffRepository::new().with_member(profile, credentials);
        let (service, _) = service_with(staff, organization, FakeTrustedDeviceRepository::new());

        let result = service
            .change_password(staff_id, "not-the-password", "a-brand-new-passphrase")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
