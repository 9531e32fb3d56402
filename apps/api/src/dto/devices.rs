use bloomconnect_domain::{DeviceInvitation, InvitationValidation, TrustedDevice};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for issuing a device invitation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-invitation-request.ts"
)]
pub struct CreateInvitationRequest {
    pub staff_id: String,
}

/// API representation of a device invitation.
///
/// The code is only returned from creation; listings include it too because
/// the admin screen shows pending codes for hand-off to the device holder.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invitation-response.ts"
)]
pub struct InvitationResponse {
    pub id: String,
    pub staff_id: String,
    pub code: String,
    pub status: String,
    pub created_at: String,
    pub expires_at: String,
    pub used_at: Option<String>,
}

impl From<DeviceInvitation> for InvitationResponse {
    fn from(invitation: DeviceInvitation) -> Self {
        Self {
            id: invitation.id.to_string(),
            staff_id: invitation.staff_id.to_string(),
            code: invitation.code,
            status: invitation.status.as_str().to_owned(),
            created_at: invitation.created_at.to_rfc3339(),
            expires_at: invitation.expires_at.to_rfc3339(),
            used_at: invitation.used_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Incoming payload for checking an invitation code.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/validate-invitation-request.ts"
)]
pub struct ValidateInvitationRequest {
    pub code: String,
}

/// Typed verdict for an invitation code check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invitation-validation-response.ts"
)]
pub struct InvitationValidationResponse {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl From<InvitationValidation> for InvitationValidationResponse {
    fn from(validation: InvitationValidation) -> Self {
        Self {
            is_valid: validation.is_valid,
            message: validation.error.map(|error| error.message().to_owned()),
        }
    }
}

/// Incoming payload for redeeming an invitation from a device.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/redeem-invitation-request.ts"
)]
pub struct RedeemInvitationRequest {
    pub code: String,
    pub fingerprint: String,
    pub pin: Option<String>,
    pub biometric_credential_id: Option<String>,
}

/// API representation of a trusted device.
///
/// Never exposes the PIN hash or the fingerprint digest.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/trusted-device-response.ts"
)]
pub struct TrustedDeviceResponse {
    pub id: String,
    pub staff_id: String,
    pub has_pin: bool,
    pub has_biometric: bool,
    pub last_used_at: Option<String>,
    pub expires_at: String,
}

impl From<TrustedDevice> for TrustedDeviceResponse {
    fn from(device: TrustedDevice) -> Self {
        Self {
            id: device.id.to_string(),
            staff_id: device.staff_id.to_string(),
            has_pin: device.pin_hash.is_some(),
            has_biometric: device.biometric_credential_id.is_some(),
            last_used_at: device.last_used_at.map(|at| at.to_rfc3339()),
            expires_at: device.expires_at.to_rfc3339(),
        }
    }
}
