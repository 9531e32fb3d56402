use serde::{Deserialize, Serialize};

use crate::OrganizationId;

/// User information persisted in the authenticated session.
///
/// Carries the claims downstream access decisions read: the stable subject,
/// the organization the subject belongs to, the role claim string, and
/// whether a password change is still pending. The session observer resolves
/// the full staff profile separately; an identity alone never counts as
/// authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    subject: String,
    display_name: String,
    email: Option<String>,
    organization_id: OrganizationId,
    role: String,
    must_change_password: bool,
}

impl Identity {
    /// Creates an identity from authentication and tenancy data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        organization_id: OrganizationId,
        role: impl Into<String>,
        must_change_password: bool,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            organization_id,
            role: role.into(),
            must_change_password,
        }
    }

    /// Returns the stable subject for the authenticated staff member.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if one is on record.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the organization linked to the identity.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the raw role claim string.
    ///
    /// Claims are stored as strings so that an identity minted before a role
    /// was renamed still deserializes; access decisions parse the claim and
    /// deny on anything unknown.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns whether the subject must change their password before
    /// accessing anything else.
    #[must_use]
    pub fn must_change_password(&self) -> bool {
        self.must_change_password
    }
}
