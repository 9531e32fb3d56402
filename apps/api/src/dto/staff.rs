use bloomconnect_domain::StaffProfile;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for provisioning a staff member.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/provision-staff-request.ts"
)]
pub struct ProvisionStaffRequest {
    pub display_name: String,
    pub role: String,
    pub staff_number: String,
    pub email: String,
    pub temporary_password: String,
}

/// Incoming payload for a partial staff profile update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-staff-request.ts"
)]
pub struct UpdateStaffRequest {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub staff_number: Option<String>,
}

/// API representation of a staff profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/staff-profile-response.ts"
)]
pub struct StaffProfileResponse {
    pub id: String,
    pub display_name: String,
    pub role: String,
    pub staff_number: String,
    pub email: String,
    pub is_active: bool,
    pub retired_at: Option<String>,
    pub password_setup_completed: bool,
}

impl From<StaffProfile> for StaffProfileResponse {
    fn from(profile: StaffProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            display_name: profile.display_name,
            role: profile.role.as_str().to_owned(),
            staff_number: profile.staff_number.as_str().to_owned(),
            email: profile.email.as_str().to_owned(),
            is_active: profile.is_active,
            retired_at: profile.retired_at.map(|at| at.to_rfc3339()),
            password_setup_completed: profile.password_setup_completed,
        }
    }
}
