use bloomconnect_domain::Organization;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for onboarding an organization.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/onboard-organization-request.ts"
)]
pub struct OnboardOrganizationRequest {
    pub name: String,
    pub code: String,
    pub plan_tier: String,
    pub contracted_apps: Vec<String>,
}

/// Incoming payload for a plan change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/change-plan-request.ts"
)]
pub struct ChangePlanRequest {
    pub plan_tier: String,
    pub staff_limit_override: Option<i32>,
}

/// Incoming payload for replacing the contracted app list.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-contracted-apps-request.ts"
)]
pub struct UpdateContractedAppsRequest {
    pub contracted_apps: Vec<String>,
}

/// API representation of an organization.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/organization-response.ts"
)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub code: String,
    pub plan_tier: String,
    pub staff_limit: i32,
    pub contracted_apps: Vec<String>,
    pub is_active: bool,
}

impl From<Organization> for OrganizationResponse {
    fn from(organization: Organization) -> Self {
        Self {
            id: organization.id.to_string(),
            name: organization.name,
            code: organization.code.as_str().to_owned(),
            plan_tier: organization.plan_tier.as_str().to_owned(),
            staff_limit: organization.staff_limit,
            contracted_apps: organization.contracted_apps,
            is_active: organization.is_active,
        }
    }
}
