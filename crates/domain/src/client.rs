//! Client (care recipient) domain types.

use bloomconnect_core::OrganizationId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a new random client identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a client identifier from an existing UUID value.
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

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A person receiving care at a facility.
///
/// Soft-deleted only: `is_active = false` plus `deleted_at`, so care history
/// stays attributable after a client leaves the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier.
    pub id: ClientId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub display_name: String,
    /// Phonetic reading of the name, for sorted rosters.
    pub phonetic_name: Option<String>,
    /// Date of birth, if recorded.
    pub birth_date: Option<NaiveDate>,
    /// Free-form care notes.
    pub care_notes: Option<String>,
    /// False once the client record is soft-deleted.
    pub is_active: bool,
    /// When the record was soft-deleted, if ever.
    pub deleted_at: Option<DateTime<Utc>>,
}
