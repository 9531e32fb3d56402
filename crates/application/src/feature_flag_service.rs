//! Per-organization feature flag store.
//!
//! Flags are an explicit store keyed by `(organization, feature)`; a feature
//! with no entry is disabled. Screens ask the store, never a hardcoded list.

use std::sync::Arc;

use async_trait::async_trait;

use bloomconnect_core::{AppResult, OrganizationId};
use bloomconnect_domain::{AuditAction, FeatureFlag, RolloutState};

use crate::{AuditEvent, AuditService};

/// Repository port for feature flag persistence.
#[async_trait]
pub trait FeatureFlagRepository: Send + Sync {
    /// Finds one flag entry.
    async fn find(
        &self,
        organization_id: OrganizationId,
        feature_id: &str,
    ) -> AppResult<Option<FeatureFlag>>;

    /// Inserts or replaces a flag entry.
    async fn upsert(&self, flag: &FeatureFlag) -> AppResult<()>;

    /// Lists every flag entry for an organization.
    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<FeatureFlag>>;
}

/// Application service for feature flags.
#[derive(Clone)]
pub struct FeatureFlagService {
    repository: Arc<dyn FeatureFlagRepository>,
    audit_service: AuditService,
}

impl FeatureFlagService {
    /// Creates a new feature flag service.
    #[must_use]
    pub fn new(repository: Arc<dyn FeatureFlagRepository>, audit_service: AuditService) -> Self {
        Self {
            repository,
            audit_service,
        }
    }

    /// Returns whether a feature is enabled for the organization.
    ///
    /// Missing entries are disabled. Store errors propagate; callers that
    /// want fail-closed rendering map them to `false` at the edge.
    pub async fn is_enabled(
        &self,
        organization_id: OrganizationId,
        feature_id: &str,
    ) -> AppResult<bool> {
        let flag = self.repository.find(organization_id, feature_id).await?;
        Ok(flag.is_some_and(|flag| flag.state == RolloutState::Enabled))
    }

    /// Sets the rollout state for a feature.
    pub async fn set_flag(
        &self,
        organization_id: OrganizationId,
        feature_id: &str,
        state: RolloutState,
        description: Option<String>,
        acting_subject: &str,
    ) -> AppResult<FeatureFlag> {
        let flag = FeatureFlag {
            organization_id,
            feature_id: feature_id.to_owned(),
            state,
            description,
        };

        self.repository.upsert(&flag).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::FeatureFlagChanged,
                resource_type: "feature_flag".to_owned(),
                resource_id: feature_id.to_owned(),
                detail: Some(format!("state={}", state.as_str())),
            })
            .await?;

        Ok(flag)
    }

    /// Lists every flag entry for the organization.
    pub async fn list(&self, organization_id: OrganizationId) -> AppResult<Vec<FeatureFlag>> {
        self.repository.list_for_organization(organization_id).await
    }
}
