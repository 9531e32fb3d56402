//! PostgreSQL-backed feature flag repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::FeatureFlagRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{FeatureFlag, RolloutState};

/// PostgreSQL implementation of the feature flag repository port.
#[derive(Clone)]
pub struct PostgresFeatureFlagRepository {
    pool: PgPool,
}

impl PostgresFeatureFlagRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FeatureFlagRow {
    organization_id: Uuid,
    feature_id: String,
    state: String,
    description: Option<String>,
}

impl FeatureFlagRow {
    fn into_flag(self) -> AppResult<FeatureFlag> {
        let state: RolloutState = self.state.parse().map_err(|error| {
            AppError::Internal(format!("stored feature flag row is invalid: {error}"))
        })?;

        Ok(FeatureFlag {
            organization_id: OrganizationId::from_uuid(self.organization_id),
            feature_id: self.feature_id,
            state,
            description: self.description,
        })
    }
}

#[async_trait]
impl FeatureFlagRepository for PostgresFeatureFlagRepository {
    async fn find(
        &self,
        organization_id: OrganizationId,
        feature_id: &str,
    ) -> AppResult<Option<FeatureFlag>> {
        let row = sqlx::query_as::<_, FeatureFlagRow>(
            r#"
            SELECT organization_id, feature_id, state, description
            FROM feature_flags
            WHERE organization_id = $1 AND feature_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(feature_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find feature flag: {error}")))?;

        row.map(FeatureFlagRow::into_flag).transpose()
    }

    async fn upsert(&self, flag: &FeatureFlag) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feature_flags (organization_id, feature_id, state, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id, feature_id)
            DO UPDATE SET
                state = EXCLUDED.state,
                description = EXCLUDED.description,
                updated_at = now()
            "#,
        )
        .bind(flag.organization_id.as_uuid())
        .bind(&flag.feature_id)
        .bind(flag.state.as_str())
        .bind(&flag.description)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert feature flag: {error}")))?;

        Ok(())
    }

    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<FeatureFlag>> {
        let rows = sqlx::query_as::<_, FeatureFlagRow>(
            r#"
            SELECT organization_id, feature_id, state, description
            FROM feature_flags
            WHERE organization_id = $1
            ORDER BY feature_id ASC
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list feature flags: {error}")))?;

        rows.into_iter().map(FeatureFlagRow::into_flag).collect()
    }
}
