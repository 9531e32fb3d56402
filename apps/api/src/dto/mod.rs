mod audit;
mod auth;
mod clients;
mod common;
mod devices;
mod flags;
mod notifications;
mod organizations;
mod staff;

pub use audit::AuditLogEntryResponse;
pub use auth::{
    ChangePasswordRequest, DeviceLoginRequest, LoginRequest, LoginResponse, RouteDecisionResponse,
};
pub use clients::{ClientResponse, CreateClientRequest, UpdateClientRequest};
pub use common::{HealthResponse, IdentityResponse};
pub use devices::{
    CreateInvitationRequest, InvitationResponse, InvitationValidationResponse,
    RedeemInvitationRequest, TrustedDeviceResponse, ValidateInvitationRequest,
};
pub use flags::{FeatureEnabledResponse, FeatureFlagResponse, SetFeatureFlagRequest};
pub use notifications::{NotificationResponse, PublishNotificationRequest};
pub use organizations::{
    ChangePlanRequest, OnboardOrganizationRequest, OrganizationResponse,
    UpdateContractedAppsRequest,
};
pub use staff::{ProvisionStaffRequest, StaffProfileResponse, UpdateStaffRequest};

#[cfg(test)]
mod tests {
    use super::{
        AuditLogEntryResponse, ChangePasswordRequest, ChangePlanRequest, ClientResponse,
        CreateClientRequest, CreateInvitationRequest, DeviceLoginRequest, FeatureEnabledResponse,
        FeatureFlagResponse, HealthResponse, IdentityResponse,
        InvitationResponse, InvitationValidationResponse, LoginRequest, LoginResponse,
        NotificationResponse, OnboardOrganizationRequest, OrganizationResponse,
        ProvisionStaffRequest, PublishNotificationRequest, RedeemInvitationRequest,
        RouteDecisionResponse, SetFeatureFlagRequest, StaffProfileResponse, TrustedDeviceResponse,
        UpdateClientRequest, UpdateContractedAppsRequest, UpdateStaffRequest,
        ValidateInvitationRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        LoginRequest::export(&config)?;
        LoginResponse::export(&config)?;
        DeviceLoginRequest::export(&config)?;
        ChangePasswordRequest::export(&config)?;
        RouteDecisionResponse::export(&config)?;
        ProvisionStaffRequest::export(&config)?;
        UpdateStaffRequest::export(&config)?;
        StaffProfileResponse::export(&config)?;
        CreateClientRequest::export(&config)?;
        UpdateClientRequest::export(&config)?;
        ClientResponse::export(&config)?;
        OnboardOrganizationRequest::export(&config)?;
        ChangePlanRequest::export(&config)?;
        UpdateContractedAppsRequest::export(&config)?;
        OrganizationResponse::export(&config)?;
        CreateInvitationRequest::export(&config)?;
        InvitationResponse::export(&config)?;
        ValidateInvitationRequest::export(&config)?;
        InvitationValidationResponse::export(&config)?;
        RedeemInvitationRequest::export(&config)?;
        TrustedDeviceResponse::export(&config)?;
        PublishNotificationRequest::export(&config)?;
        NotificationResponse::export(&config)?;
        SetFeatureFlagRequest::export(&config)?;
        FeatureFlagResponse::export(&config)?;
        FeatureEnabledResponse::export(&config)?;
        AuditLogEntryResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;
        IdentityResponse::export(&config)?;

        Ok(())
    }
}
