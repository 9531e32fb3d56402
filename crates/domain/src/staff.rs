//! Staff domain types and validation rules.
//!
//! Follows OWASP Authentication and Password Storage cheat sheets for all
//! password strength and email validation rules.

use std::str::FromStr;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a staff profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(Uuid);

impl StaffId {
    /// Creates a new random staff identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a staff identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role assigned to a staff profile.
///
/// Access decisions treat any role string that fails to parse as "no role",
/// which denies every non-public path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Facility administrator: full access including organization settings.
    Admin,
    /// Regular care staff.
    Staff,
    /// Platform developer with access to diagnostic screens.
    Developer,
    /// General account with read-mostly access (e.g. shared floor tablets).
    General,
}

impl StaffRole {
    /// Returns the stable storage string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Developer => "developer",
            Self::General => "general",
        }
    }

    /// Returns all registered roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[StaffRole] = &[
            StaffRole::Admin,
            StaffRole::Staff,
            StaffRole::Developer,
            StaffRole::General,
        ];

        ALL
    }
}

impl FromStr for StaffRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "developer" => Ok(Self::Developer),
            "general" => Ok(Self::General),
            _ => Err(AppError::Validation(format!(
                "unknown staff role '{value}'"
            ))),
        }
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let (local, domain) = match trimmed.split_once('@') {
            Some(parts) if trimmed.matches('@').count() == 1 => parts,
            _ => {
                return Err(AppError::Validation(
                    "email address must contain exactly one '@'".to_owned(),
                ));
            }
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Validated short staff number as printed on name badges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffNumber(String);

impl StaffNumber {
    /// Creates a validated staff number: one to six ASCII digits.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.len() > 6 {
            return Err(AppError::Validation(
                "staff number must be between 1 and 6 digits".to_owned(),
            ));
        }

        if !trimmed.chars().all(|character| character.is_ascii_digit()) {
            return Err(AppError::Validation(
                "staff number must contain only digits".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated staff number string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Minimum password length (NIST SP800-63B).
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Maximum password length to allow passphrases (OWASP recommendation: at least 64).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password against OWASP and NIST rules.
///
/// - Flat minimum of 10 characters (device PINs are a separate credential
///   and never relax the password rules).
/// - Max length is 128 characters (protects against Argon2id DoS).
/// - Rejects common breached passwords from an embedded list.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    if is_common_password(password) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

/// Checks whether a password appears in the embedded common passwords list.
fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|entry| *entry == lowered)
}

/// Top breached passwords (subset for fast embedded check).
/// Production deployments should integrate HaveIBeenPwned k-anonymity API.
static COMMON_PASSWORDS: &[&str] = &[
    "password",
    "1234567890",
    "qwertyuiop",
    "abc1234567",
    "password1",
    "password123",
    "1q2w3e4r5t",
    "qwerty1234",
    "welcome123",
    "letmein123",
    "admin12345",
    "iloveyou12",
    "sunshine12",
    "princess12",
    "football12",
    "superman12",
    "passw0rd12",
    "1234512345",
    "asdfghjkl1",
    "zxcvbnm123",
];

/// Application-level record describing a staff member's role and tenant.
///
/// Soft-deleted via `is_active = false` plus a retirement timestamp; staff
/// profiles are never hard-deleted so historical audit entries keep a valid
/// subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    /// Unique staff identifier; doubles as the session subject.
    pub id: StaffId,
    /// Organization the profile belongs to. Exactly one, always.
    pub organization_id: OrganizationId,
    /// Display name shown across the application.
    pub display_name: String,
    /// Assigned role.
    pub role: StaffRole,
    /// Badge number used for expedited lookup at the facility.
    pub staff_number: StaffNumber,
    /// Canonical email address, the password login key.
    pub email: EmailAddress,
    /// False once the profile is retired.
    pub is_active: bool,
    /// When the profile was retired, if ever.
    pub retired_at: Option<DateTime<Utc>>,
    /// True once the member replaced their provisioned temporary password.
    pub password_setup_completed: bool,
}

impl StaffProfile {
    /// Returns whether the member still has to replace their temporary password.
    #[must_use]
    pub fn must_change_password(&self) -> bool {
        !self.password_setup_completed
    }
}
