use std::str::FromStr;

use bloomconnect_core::{AppError, OrganizationId};
use serde::{Deserialize, Serialize};

/// Rollout state for a feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutState {
    /// Feature is visible.
    Enabled,
    /// Feature is hidden.
    Disabled,
}

impl RolloutState {
    /// Returns the stable storage string for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for RolloutState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            _ => Err(AppError::Validation(format!(
                "unknown rollout state '{value}'"
            ))),
        }
    }
}

/// One feature flag entry: feature id mapped to a rollout state within an
/// organization. Features with no entry are treated as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    /// Organization the flag applies to.
    pub organization_id: OrganizationId,
    /// Stable feature identifier (e.g. `community_board`).
    pub feature_id: String,
    /// Current rollout state.
    pub state: RolloutState,
    /// Optional operator note.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::RolloutState;

    #[test]
    fn rollout_state_roundtrips_storage_value() {
        for state in [RolloutState::Enabled, RolloutState::Disabled] {
            let restored: Result<RolloutState, _> = state.as_str().parse();
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(RolloutState::Disabled), state);
        }
    }

    #[test]
    fn unknown_rollout_state_is_rejected() {
        let parsed: Result<RolloutState, _> = "percentage".parse();
        assert!(parsed.is_err());
    }
}
