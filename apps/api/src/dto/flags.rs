use bloomconnect_domain::FeatureFlag;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for setting a feature flag.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-feature-flag-request.ts"
)]
pub struct SetFeatureFlagRequest {
    pub state: String,
    pub description: Option<String>,
}

/// API representation of a feature flag entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/feature-flag-response.ts"
)]
pub struct FeatureFlagResponse {
    pub feature_id: String,
    pub state: String,
    pub description: Option<String>,
}

impl From<FeatureFlag> for FeatureFlagResponse {
    fn from(flag: FeatureFlag) -> Self {
        Self {
            feature_id: flag.feature_id,
            state: flag.state.as_str().to_owned(),
            description: flag.description,
        }
    }
}

/// Effective on/off answer for one feature.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/feature-enabled-response.ts"
)]
pub struct FeatureEnabledResponse {
    pub feature_id: String,
    pub enabled: bool,
}
