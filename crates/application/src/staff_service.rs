//! Staff profile management beyond authentication: listing, updates,
//! and retirement.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{AuditAction, StaffId, StaffNumber, StaffProfile, StaffRole};

use crate::{AuditEvent, AuditService, StaffRepository, TrustedDeviceRepository};

/// Partial update for a staff profile. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct StaffUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New role.
    pub role: Option<StaffRole>,
    /// New badge number.
    pub staff_number: Option<String>,
}

/// Application service for staff profile management.
#[derive(Clone)]
pub struct StaffService {
    staff_repository: Arc<dyn StaffRepository>,
    trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
    audit_service: AuditService,
}

impl StaffService {
    /// Creates a new staff service.
    #[must_use]
    pub fn new(
        staff_repository: Arc<dyn StaffRepository>,
        trusted_device_repository: Arc<dyn TrustedDeviceRepository>,
        audit_service: AuditService,
    ) -> Self {
        Self {
            staff_repository,
            trusted_device_repository,
            audit_service,
        }
    }

    /// Returns one staff profile, scoped to the caller's organization.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        staff_id: StaffId,
    ) -> AppResult<StaffProfile> {
        let profile = self
            .staff_repository
            .find_profile(staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound("staff member not found".to_owned()))?;

        if profile.organization_id != organization_id {
            // Cross-tenant probes read as missing, not forbidden.
            return Err(AppError::NotFound("staff member not found".to_owned()));
        }

        Ok(profile)
    }

    /// Lists all profiles in the organization.
    pub async fn list(&self, organization_id: OrganizationId) -> AppResult<Vec<StaffProfile>> {
        self.staff_repository
            .list_for_organization(organization_id)
            .await
    }

    /// Applies a partial update to a staff profile.
    ///
    /// Role changes get their own audit action so the trail distinguishes a
    /// rename from a privilege change.
    pub async fn update(
        &self,
        organization_id: OrganizationId,
        staff_id: StaffId,
        update: StaffUpdate,
        acting_subject: &str,
    ) -> AppResult<StaffProfile> {
        let mut profile = self.get(organization_id, staff_id).await?;

        if !profile.is_active {
            return Err(AppError::Validation(
                "cannot update a retired staff profile".to_owned(),
            ));
        }

        let mut role_changed = None;
        if let Some(role) = update.role
            && role != profile.role
        {
            role_changed = Some((profile.role, role));
            profile.role = role;
        }

        if let Some(display_name) = update.display_name {
            let trimmed = display_name.trim();
            if trimmed.is_empty() {
                return Err(AppError::Validation(
                    "display name must not be empty".to_owned(),
                ));
            }
            profile.display_name = trimmed.to_owned();
        }

        if let Some(staff_number) = update.staff_number {
            profile.staff_number = StaffNumber::new(staff_number)?;
        }

        self.staff_repository.update_profile(&profile).await?;

        if let Some((previous, next)) = role_changed {
            self.audit_service
                .append_event(AuditEvent {
                    organization_id,
                    subject: acting_subject.to_owned(),
                    action: AuditAction::StaffRoleChanged,
                    resource_type: "staff".to_owned(),
                    resource_id: staff_id.to_string(),
                    detail: Some(format!("{} -> {}", previous.as_str(), next.as_str())),
                })
                .await?;
        } else {
            self.audit_service
                .append_event(AuditEvent {
                    organization_id,
                    subject: acting_subject.to_owned(),
                    action: AuditAction::StaffUpdated,
                    resource_type: "staff".to_owned(),
                    resource_id: staff_id.to_string(),
                    detail: None,
                })
                .await?;
        }

        Ok(profile)
    }

    /// Retires a staff profile and revokes every device bound to it.
    ///
    /// The profile stays on record so past audit entries keep a valid
    /// subject; it can no longer log in by password or device.
    pub async fn retire(
        &self,
        organization_id: OrganizationId,
        staff_id: StaffId,
        acting_subject: &str,
    ) -> AppResult<()> {
        let profile = self.get(organization_id, staff_id).await?;

        if !profile.is_active {
            return Err(AppError::Conflict(
                "staff profile is already retired".to_owned(),
            ));
        }

        self.staff_repository.retire(staff_id, Utc::now()).await?;

        for device in self
            .trusted_device_repository
            .list_for_staff(staff_id)
            .await?
        {
            self.trusted_device_repository.revoke(device.id).await?;
        }

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::StaffRetired,
                resource_type: "staff".to_owned(),
                resource_id: staff_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use bloomconnect_domain::{EmailAddress, TrustedDevice, TrustedDeviceId};
    use chrono::{DateTime, Duration};

    use super::*;
    use crate::{
        AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository, StaffCredentials,
    };

    struct FakeStaffRepository {
        profiles: Mutex<HashMap<String, StaffProfile>>,
    }

    impl FakeStaffRepository {
        fn with(profile: StaffProfile) -> Self {
            let mut profiles = HashMap::new();
            profiles.insert(profile.id.to_string(), profile);
            Self {
                profiles: Mutex::new(profiles),
            }
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
            _organization_id: OrganizationId,
        ) -> AppResult<i64> {
            Ok(0)
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

        fn device_count(&self) -> usize {
            self.devices
                .lock()
                .map(|devices| devices.len())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl TrustedDeviceRepository for FakeTrustedDeviceRepository {
        async fn find_by_fingerprint_digest(
            &self,
            _digest: &str,
        ) -> AppResult<Option<TrustedDevice>> {
            Ok(None)
        }

        async fn register(&self, device: &TrustedDevice) -> AppResult<()> {
            let mut devices = self
                .devices
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            devices.push(device.clone());
            Ok(())
        }

        async fn record_login(
            &self,
            _device_id: TrustedDeviceId,
            _at: DateTime<Utc>,
        ) -> AppResult<()> {
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
            _organization_id: OrganizationId,
        ) -> AppResult<Vec<TrustedDevice>> {
            Ok(Vec::new())
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

    fn profile_in(organization_id: OrganizationId) -> StaffProfile {
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

    fn service_with(
        staff: FakeStaffRepository,
        devices: FakeTrustedDeviceRepository,
    ) -> (StaffService, Arc<FakeTrustedDeviceRepository>) {
        let devices = Arc::new(devices);
        let service = StaffService::new(
            Arc::new(staff),
            Arc::clone(&devices) as Arc<dyn TrustedDeviceRepository>,
            AuditService::new(Arc::new(NullAuditRepository), Arc::new(NullAuditLogRepository)),
        );
        (service, devices)
    }

    #[tokio::test]
    async fn update_changes_display_name() {
        let organization_id = OrganizationId::new();
        let profile = profile_in(organization_id);
        let staff_id = profile.id;
        let (service, _) = service_with(
            FakeStaffRepository::with(profile),
            FakeTrustedDeviceRepository::new(),
        );

        let updated = service
            .update(
                organization_id,
                staff_id,
                StaffUpdate {
                    display_name: Some("Aiko Sato".to_owned()),
                    ..StaffUpdate::default()
                },
                "admin-1",
            )
            .await;

        assert!(matches!(
            updated,
            Ok(ref profile) if profile.display_name == "Aiko Sato"
        ));
    }

    #[tokio::test]
    async fn cross_tenant_lookup_reads_as_missing() {
        let profile = profile_in(OrganizationId::new());
        let staff_id = profile.id;
        let (service, _) = service_with(
            FakeStaffRepository::with(profile),
            FakeTrustedDeviceRepository::new(),
        );

        let result = service.get(OrganizationId::new(), staff_id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_display_name_is_rejected() {
        let organization_id = OrganizationId::new();
        let profile = profile_in(organization_id);
        let staff_id = profile.id;
        let (service, _) = service_with(
            FakeStaffRepository::with(profile),
            FakeTrustedDeviceRepository::new(),
        );

        let result = service
            .update(
                organization_id,
                staff_id,
                StaffUpdate {
                    display_name: Some("   ".to_owned()),
                    ..StaffUpdate::default()
                },
                "admin-1",
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn retirement_revokes_bound_devices() {
        let organization_id = OrganizationId::new();
        let profile = profile_in(organization_id);
        let staff_id = profile.id;
        let device = TrustedDevice {
            id: TrustedDeviceId::new(),
            staff_id,
            organization_id,
            fingerprint_digest: "digest".to_owned(),
            pin_hash: None,
            biometric_credential_id: None,
            last_used_at: None,
            expires_at: Utc::now() + Duration::days(30),
        };
        let (service, devices) = service_with(
            FakeStaffRepository::with(profile),
            FakeTrustedDeviceRepository::with(device),
        );

        assert!(service.retire(organization_id, staff_id, "admin-1").await.is_ok());
        assert_eq!(devices.device_count(), 0);
    }

    #[tokio::test]
    async fn double_retirement_is_a_conflict() {
        let organization_id = OrganizationId::new();
        let mut profile = profile_in(organization_id);
        profile.is_active = false;
        profile.retired_at = Some(Utc::now());
        let staff_id = profile.id;
        let (service, _) = service_with(
            FakeStaffRepository::with(profile),
            FakeTrustedDeviceRepository::new(),
        );

        let result = service.retire(organization_id, staff_id, "admin-1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
