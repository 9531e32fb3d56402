use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a staff profile is provisioned.
    StaffProvisioned,
    /// Emitted when a staff profile is updated.
    StaffUpdated,
    /// Emitted when a staff role changes.
    StaffRoleChanged,
    /// Emitted when a staff profile is retired.
    StaffRetired,
    /// Emitted when a client record is created.
    ClientCreated,
    /// Emitted when a client record is updated.
    ClientUpdated,
    /// Emitted when a client record is soft-deleted.
    ClientDeleted,
    /// Emitted when an organization is onboarded.
    OrganizationOnboarded,
    /// Emitted when an organization's plan or limits change.
    OrganizationPlanChanged,
    /// Emitted when an organization's contracted app list changes.
    OrganizationAppsChanged,
    /// Emitted when an organization is deactivated.
    OrganizationDeactivated,
    /// Emitted when a device invitation is issued.
    DeviceInvitationCreated,
    /// Emitted when a device invitation is redeemed.
    DeviceInvitationRedeemed,
    /// Emitted when a trusted device is revoked.
    TrustedDeviceRevoked,
    /// Emitted when a notification is published.
    NotificationPublished,
    /// Emitted when a feature flag state changes.
    FeatureFlagChanged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaffProvisioned => "staff.provisioned",
            Self::StaffUpdated => "staff.updated",
            Self::StaffRoleChanged => "staff.role_changed",
            Self::StaffRetired => "staff.retired",
            Self::ClientCreated => "client.created",
            Self::ClientUpdated => "client.updated",
            Self::ClientDeleted => "client.deleted",
            Self::OrganizationOnboarded => "organization.onboarded",
            Self::OrganizationPlanChanged => "organization.plan_changed",
            Self::OrganizationAppsChanged => "organization.apps_changed",
            Self::OrganizationDeactivated => "organization.deactivated",
            Self::DeviceInvitationCreated => "device.invitation_created",
            Self::DeviceInvitationRedeemed => "device.invitation_redeemed",
            Self::TrustedDeviceRevoked => "device.trusted_device_revoked",
            Self::NotificationPublished => "notification.published",
            Self::FeatureFlagChanged => "feature_flag.changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn audit_actions_have_namespaced_storage_values() {
        assert_eq!(
            AuditAction::DeviceInvitationRedeemed.as_str(),
            "device.invitation_redeemed"
        );
        assert_eq!(AuditAction::StaffRetired.as_str(), "staff.retired");
    }
}
