use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for organization code + email + password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub organization_code: String,
    pub email: String,
    pub password: String,
    /// Protected path the user tried to reach before login, if any.
    pub return_to: Option<String>,
}

/// Auth status response for login flows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub status: String,
    /// Path the client should navigate to after the session is established.
    pub redirect_to: String,
}

/// Incoming payload for expedited trusted device login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/device-login-request.ts"
)]
pub struct DeviceLoginRequest {
    pub fingerprint: String,
    pub pin: Option<String>,
    pub biometric_credential_id: Option<String>,
}

/// Incoming payload for an authenticated password change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/change-password-request.ts"
)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Route decision for a requested screen path.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/route-decision-response.ts"
)]
pub struct RouteDecisionResponse {
    /// One of `loading`, `render`, `redirect`.
    pub decision: String,
    /// Target path when the decision is a redirect.
    pub redirect_to: Option<String>,
}
