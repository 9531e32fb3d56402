//! PostgreSQL-backed organization repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::OrganizationRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{Organization, OrganizationCode, PlanTier};

/// PostgreSQL implementation of the organization repository port.
#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    code: String,
    plan_tier: String,
    staff_limit: i32,
    contracted_apps: serde_json::Value,
    is_active: bool,
}

impl OrganizationRow {
    fn into_organization(self) -> AppResult<Organization> {
        let code = OrganizationCode::new(self.code).map_err(|error| {
            AppError::Internal(format!("stored organization row is invalid: {error}"))
        })?;
        let plan_tier: PlanTier = self.plan_tier.parse().map_err(|error| {
            AppError::Internal(format!("stored organization row is invalid: {error}"))
        })?;
        let contracted_apps: Vec<String> =
            serde_json::from_value(self.contracted_apps).map_err(|error| {
                AppError::Internal(format!("stored organization row is invalid: {error}"))
            })?;

        Ok(Organization {
            id: OrganizationId::from_uuid(self.id),
            name: self.name,
            code,
            plan_tier,
            staff_limit: self.staff_limit,
            contracted_apps,
            is_active: self.is_active,
        })
    }
}

const ORGANIZATION_COLUMNS: &str =
    "id, name, code, plan_tier, staff_limit, contracted_apps, is_active";

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn find_by_id(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find organization: {error}")))?;

        row.map(OrganizationRow::into_organization).transpose()
    }

    async fn find_by_code(&self, code: &OrganizationCode) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find organization by code: {error}"))
        })?;

        row.map(OrganizationRow::into_organization).transpose()
    }

    async fn create(&self, organization: &Organization) -> AppResult<()> {
        let contracted_apps =
            serde_json::to_value(&organization.contracted_apps).map_err(|error| {
                AppError::Internal(format!("failed to serialize contracted apps: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, code, plan_tier, staff_limit, contracted_apps, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(organization.code.as_str())
        .bind(organization.plan_tier.as_str())
        .bind(organization.staff_limit)
        .bind(contracted_apps)
        .bind(organization.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create organization: {error}")))?;

        Ok(())
    }

    async fn update(&self, organization: &Organization) -> AppResult<()> {
        let contracted_apps =
            serde_json::to_value(&organization.contracted_apps).map_err(|error| {
                AppError::Internal(format!("failed to serialize contracted apps: {error}"))
            })?;

        sqlx::query(
            r#"
            UPDATE organizations
            SET
                name = $2,
                plan_tier = $3,
                staff_limit = $4,
                contracted_apps = $5,
                is_active = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(organization.plan_tier.as_str())
        .bind(organization.staff_limit)
        .bind(contracted_apps)
        .bind(organization.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update organization: {error}")))?;

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list organizations: {error}")))?;

        rows.into_iter().map(OrganizationRow::into_organization).collect()
    }
}
