//! Session observer resolving identities into full session snapshots.
//!
//! Identity transitions (login, logout, session restore) arrive in any
//! order and resolve asynchronously against the staff and organization
//! stores. A generation counter makes the last transition win: a slow
//! resolution for an older transition never overwrites a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::warn;

use bloomconnect_core::{Identity, OrganizationId};
use bloomconnect_domain::{Organization, StaffId, StaffProfile, StaffRole};
use uuid::Uuid;

use crate::{OrganizationRepository, StaffRepository};

/// Resolved session state published to subscribers.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Identity from the session store, if any.
    pub identity: Option<Identity>,
    /// Staff profile resolved for the identity.
    pub profile: Option<StaffProfile>,
    /// Organization resolved for the identity.
    pub organization: Option<Organization>,
    /// True while a transition is still resolving.
    pub is_loading: bool,
}

impl SessionSnapshot {
    /// Initial state before the first transition resolves.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            identity: None,
            profile: None,
            organization: None,
            is_loading: true,
        }
    }

    fn resolving(identity: Option<Identity>) -> Self {
        Self {
            identity,
            profile: None,
            organization: None,
            is_loading: true,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            identity: None,
            profile: None,
            organization: None,
            is_loading: false,
        }
    }

    /// Returns whether the snapshot represents a fully resolved, authorized
    /// session. An identity whose profile failed to resolve never counts.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.is_loading && self.identity.is_some() && self.profile.is_some()
    }

    /// Returns the resolved role, if authenticated.
    #[must_use]
    pub fn role(&self) -> Option<StaffRole> {
        self.profile.as_ref().map(|profile| profile.role)
    }

    /// Returns whether a password change is still pending for the session.
    #[must_use]
    pub fn must_change_password(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(StaffProfile::must_change_password)
    }
}

/// Session observer service.
#[derive(Clone)]
pub struct SessionService {
    staff_repository: Arc<dyn StaffRepository>,
    organization_repository: Arc<dyn OrganizationRepository>,
    generation: Arc<AtomicU64>,
    sender: watch::Sender<SessionSnapshot>,
}

impl SessionService {
    /// Creates a session service in the initial loading state.
    #[must_use]
    pub fn new(
        staff_repository: Arc<dyn StaffRepository>,
        organization_repository: Arc<dyn OrganizationRepository>,
    ) -> Self {
        let (sender, _) = watch::channel(SessionSnapshot::loading());
        Self {
            staff_repository,
            organization_repository,
            generation: Arc::new(AtomicU64::new(0)),
            sender,
        }
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.sender.borrow().clone()
    }

    /// Handles an identity transition from the session store.
    ///
    /// Publishes a loading snapshot immediately, then resolves the profile
    /// and organization. If a newer transition started in the meantime, the
    /// resolved result is discarded rather than published.
    pub async fn on_identity_changed(&self, identity: Option<Identity>) {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // send_replace stores the value even when no receiver is subscribed,
        // which is the normal case for request-scoped callers.
        self.sender
            .send_replace(SessionSnapshot::resolving(identity.clone()));

        let snapshot = match identity {
            None => SessionSnapshot::unauthenticated(),
            Some(identity) => self.resolve(identity).await,
        };

        if self.generation.load(Ordering::SeqCst) == my_generation {
            self.sender.send_replace(snapshot);
        }
    }

    /// Resolves an identity into a full snapshot, failing closed.
    ///
    /// Any lookup error, missing record, retired profile, or deactivated
    /// organization resolves to the unauthenticated state.
    async fn resolve(&self, identity: Identity) -> SessionSnapshot {
        let Ok(staff_id) = identity.subject().parse::<Uuid>().map(StaffId::from_uuid) else {
            warn!(subject = identity.subject(), "session subject is not a valid staff id");
            return SessionSnapshot::unauthenticated();
        };

        let profile = match self.staff_repository.find_profile(staff_id).await {
            Ok(Some(profile)) if profile.is_active => profile,
            Ok(_) => {
                warn!(subject = identity.subject(), "session profile missing or retired");
                return SessionSnapshot::unauthenticated();
            }
            Err(error) => {
                warn!(
                    subject = identity.subject(),
                    "failed to resolve session profile: {error}"
                );
                return SessionSnapshot::unauthenticated();
            }
        };

        let organization_id: OrganizationId = profile.organization_id;
        let organization = match self.organization_repository.find_by_id(organization_id).await {
            Ok(Some(organization)) if organization.is_active => organization,
            Ok(_) => {
                warn!(%organization_id, "session organization missing or deactivated");
                return SessionSnapshot::unauthenticated();
            }
            Err(error) => {
                warn!(%organization_id, "failed to resolve session organization: {error}");
                return SessionSnapshot::unauthenticated();
            }
        };

        SessionSnapshot {
            identity: Some(identity),
            profile: Some(profile),
            organization: Some(organization),
            is_loading: false,
        }
    }
}
