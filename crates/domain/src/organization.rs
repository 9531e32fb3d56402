//! Organization (tenant) domain types.

use std::str::FromStr;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use serde::{Deserialize, Serialize};

/// Human-entered login key identifying an organization on the sign-in screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationCode(String);

impl OrganizationCode {
    /// Creates a validated organization code: 4 to 12 lowercase ASCII
    /// alphanumerics. Input is trimmed and lowercased before validation so
    /// the code staff type on a tablet keyboard always canonicalizes.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let canonical = value.trim().to_lowercase();

        if canonical.len() < 4 || canonical.len() > 12 {
            return Err(AppError::Validation(
                "organization code must be between 4 and 12 characters".to_owned(),
            ));
        }

        if !canonical
            .chars()
            .all(|character| character.is_ascii_lowercase() || character.is_ascii_digit())
        {
            return Err(AppError::Validation(
                "organization code must contain only letters and digits".to_owned(),
            ));
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<OrganizationCode> for String {
    fn from(value: OrganizationCode) -> Self {
        value.0
    }
}

/// Contracted plan tier for an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Evaluation plan with a low staff limit.
    Trial,
    /// Standard paid plan.
    Standard,
    /// Premium plan with the full app catalogue.
    Premium,
}

impl PlanTier {
    /// Returns the stable storage string for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    /// Default staff limit applied at onboarding for this tier.
    #[must_use]
    pub fn default_staff_limit(&self) -> i32 {
        match self {
            Self::Trial => 5,
            Self::Standard => 50,
            Self::Premium => 300,
        }
    }
}

impl FromStr for PlanTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "trial" => Ok(Self::Trial),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(AppError::Validation(format!("unknown plan tier '{value}'"))),
        }
    }
}

/// Tenant boundary grouping staff profiles and clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: OrganizationId,
    /// Facility name.
    pub name: String,
    /// Human-entered login key. Unique across all organizations.
    pub code: OrganizationCode,
    /// Contracted plan tier.
    pub plan_tier: PlanTier,
    /// Maximum number of active staff profiles.
    pub staff_limit: i32,
    /// Logical names of the contracted feature apps.
    pub contracted_apps: Vec<String>,
    /// False once the contract is terminated; inactive organizations
    /// cannot sign in.
    pub is_active: bool,
}
