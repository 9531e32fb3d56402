//! Organization lifecycle ports and application service.

use std::sync::Arc;

use async_trait::async_trait;

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{AuditAction, Organization, OrganizationCode, PlanTier};

use crate::{AuditEvent, AuditService};

/// Repository port for organization persistence.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Finds an organization by its identifier.
    async fn find_by_id(&self, organization_id: OrganizationId)
    -> AppResult<Option<Organization>>;

    /// Finds an organization by its login code.
    async fn find_by_code(&self, code: &OrganizationCode) -> AppResult<Option<Organization>>;

    /// Persists a new organization.
    async fn create(&self, organization: &Organization) -> AppResult<()>;

    /// Updates an existing organization.
    async fn update(&self, organization: &Organization) -> AppResult<()>;

    /// Lists every organization, for the platform operator screen.
    async fn list_all(&self) -> AppResult<Vec<Organization>>;
}

/// Parameters for onboarding a new organization.
pub struct OnboardOrganizationParams {
    /// Facility display name.
    pub name: String,
    /// Login code staff members enter at the password login screen.
    pub code: String,
    /// Contracted plan tier; sets the default staff limit.
    pub plan_tier: PlanTier,
    /// Contracted application identifiers.
    pub contracted_apps: Vec<String>,
    /// Subject performing the onboarding, for the audit trail.
    pub acting_subject: String,
}

/// Application service for organization lifecycle operations.
#[derive(Clone)]
pub struct OrganizationService {
    repository: Arc<dyn OrganizationRepository>,
    audit_service: AuditService,
}

impl OrganizationService {
    /// Creates a new organization service.
    #[must_use]
    pub fn new(repository: Arc<dyn OrganizationRepository>, audit_service: AuditService) -> Self {
        Self {
            repository,
            audit_service,
        }
    }

    /// Onboards a new organization with the default staff limit for its plan.
    pub async fn onboard(&self, params: OnboardOrganizationParams) -> AppResult<Organization> {
        if params.name.trim().is_empty() {
            return Err(AppError::Validation(
                "organization name must not be empty".to_owned(),
            ));
        }

        let code = OrganizationCode::new(&params.code)?;
        if self.repository.find_by_code(&code).await?.is_some() {
            return Err(AppError::Conflict(
                "an organization with this code already exists".to_owned(),
            ));
        }

        let organization = Organization {
            id: OrganizationId::new(),
            name: params.name.trim().to_owned(),
            code,
            plan_tier: params.plan_tier,
            staff_limit: params.plan_tier.default_staff_limit(),
            contracted_apps: params.contracted_apps,
            is_active: true,
        };

        self.repository.create(&organization).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id: organization.id,
                subject: params.acting_subject,
                action: AuditAction::OrganizationOnboarded,
                resource_type: "organization".to_owned(),
                resource_id: organization.id.to_string(),
                detail: Some(format!("plan={}", organization.plan_tier.as_str())),
            })
            .await?;

        Ok(organization)
    }

    /// Returns an organization by id.
    pub async fn get(&self, organization_id: OrganizationId) -> AppResult<Organization> {
        self.repository
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("organization not found".to_owned()))
    }

    /// Lists every organization for the platform operator screen.
    pub async fn list_all(&self) -> AppResult<Vec<Organization>> {
        self.repository.list_all().await
    }

    /// Changes the plan tier, optionally overriding the default staff limit.
    ///
    /// Never evicts existing staff: a limit below the current headcount only
    /// blocks further provisioning.
    pub async fn change_plan(
        &self,
        organization_id: OrganizationId,
        plan_tier: PlanTier,
        staff_limit_override: Option<i32>,
        acting_subject: &str,
    ) -> AppResult<Organization> {
        let mut organization = self.get(organization_id).await?;

        if let Some(limit) = staff_limit_override
            && limit <= 0
        {
            return Err(AppError::Validation(
                "staff limit must be positive".to_owned(),
            ));
        }

        organization.plan_tier = plan_tier;
        organization.staff_limit =
            staff_limit_override.unwrap_or_else(|| plan_tier.default_staff_limit());

        self.repository.update(&organization).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::OrganizationPlanChanged,
                resource_type: "organization".to_owned(),
                resource_id: organization_id.to_string(),
                detail: Some(format!(
                    "plan={} staff_limit={}",
                    plan_tier.as_str(),
                    organization.staff_limit
                )),
            })
            .await?;

        Ok(organization)
    }

    /// Replaces the contracted application list.
    pub async fn update_contracted_apps(
        &self,
        organization_id: OrganizationId,
        contracted_apps: Vec<String>,
        acting_subject: &str,
    ) -> AppResult<Organization> {
        let mut organization = self.get(organization_id).await?;
        organization.contracted_apps = contracted_apps;
        self.repository.update(&organization).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::OrganizationAppsChanged,
                resource_type: "organization".to_owned(),
                resource_id: organization_id.to_string(),
                detail: Some(organization.contracted_apps.join(",")),
            })
            .await?;

        Ok(organization)
    }

    /// Deactivates an organization, blocking every login under it.
    pub async fn deactivate(
        &self,
        organization_id: OrganizationId,
        acting_subject: &str,
    ) -> AppResult<()> {
        let mut organization = self.get(organization_id).await?;
        organization.is_active = false;
        self.repository.update(&organization).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::OrganizationDeactivated,
                resource_type: "organization".to_owned(),
                resource_id: organization_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(())
    }
}
