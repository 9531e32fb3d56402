use bloomconnect_core::Identity;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the authenticated staff member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/identity-response.ts"
)]
pub struct IdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub organization_id: String,
    pub role: String,
    pub must_change_password: bool,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            organization_id: identity.organization_id().to_string(),
            role: identity.role().to_owned(),
            must_change_password: identity.must_change_password(),
        }
    }
}
