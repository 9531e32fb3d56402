//! Append-only audit trail ports and service.

use std::sync::Arc;

use async_trait::async_trait;
use bloomconnect_core::{AppResult, OrganizationId};
use bloomconnect_domain::AuditAction;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Organization scope for the event.
    pub organization_id: OrganizationId,
    /// Subject that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Audit log entry projection for the admin audit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier.
    pub event_id: String,
    /// Actor subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: String,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<String>,
    /// Optional subject filter.
    pub subject: Option<String>,
}

/// Port for reading recent audit log entries.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists recent audit entries for an organization, newest first.
    async fn list_recent_entries(
        &self,
        organization_id: OrganizationId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>>;
}

/// Application service for the audit trail.
///
/// Writes are independent best-effort operations with no cross-entity
/// transaction: a caller whose primary write succeeded but whose audit append
/// failed receives the audit error and decides how to surface it.
#[derive(Clone)]
pub struct AuditService {
    repository: Arc<dyn AuditRepository>,
    log_repository: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    /// Creates a new audit service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuditRepository>,
        log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            repository,
            log_repository,
        }
    }

    /// Persists one audit event.
    pub async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.repository.append_event(event).await
    }

    /// Lists recent audit entries for the admin audit screen.
    pub async fn list_recent_entries(
        &self,
        organization_id: OrganizationId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.log_repository
            .list_recent_entries(organization_id, query)
            .await
    }
}
