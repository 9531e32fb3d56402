//! PostgreSQL-backed device invitation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::DeviceInvitationRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{DeviceInvitation, DeviceInvitationId, InvitationStatus, StaffId};

/// PostgreSQL implementation of the device invitation repository port.
#[derive(Clone)]
pub struct PostgresDeviceInvitationRepository {
    pool: PgPool,
}

impl PostgresDeviceInvitationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InvitationRow {
    id: Uuid,
    organization_id: Uuid,
    staff_id: Uuid,
    code: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    used_by_fingerprint: Option<String>,
}

impl InvitationRow {
    fn into_invitation(self) -> AppResult<DeviceInvitation> {
        let status: InvitationStatus = self.status.parse().map_err(|error| {
            AppError::Internal(format!("stored invitation row is invalid: {error}"))
        })?;

        Ok(DeviceInvitation {
            id: DeviceInvitationId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            staff_id: StaffId::from_uuid(self.staff_id),
            code: self.code,
            status,
            created_at: self.created_at,
            expires_at: self.expires_at,
            used_at: self.used_at,
            used_by_fingerprint: self.used_by_fingerprint,
        })
    }
}

const INVITATION_COLUMNS: &str = r#"
    id,
    organization_id,
    staff_id,
    code,
    status,
    created_at,
    expires_at,
    used_at,
    used_by_fingerprint
"#;

#[async_trait]
impl DeviceInvitationRepository for PostgresDeviceInvitationRepository {
    async fn insert(&self, invitation: &DeviceInvitation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_invitations (
                id,
                organization_id,
                staff_id,
                code,
                status,
                created_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(invitation.id.as_uuid())
        .bind(invitation.organization_id.as_uuid())
        .bind(invitation.staff_id.as_uuid())
        .bind(&invitation.code)
        .bind(invitation.status.as_str())
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert invitation: {error}")))?;

        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<DeviceInvitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM device_invitations
            WHERE code = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find invitation by code: {error}"))
        })?;

        row.map(InvitationRow::into_invitation).transpose()
    }

    async fn active_code_exists(&self, code: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM device_invitations
                WHERE code = $1 AND status = 'pending' AND expires_at > now()
            )
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check invitation code uniqueness: {error}"))
        })?;

        Ok(exists)
    }

    async fn mark_used(
        &self,
        invitation_id: DeviceInvitationId,
        used_at: DateTime<Utc>,
        used_by_fingerprint: &str,
    ) -> AppResult<()> {
        // Guarded by status so a concurrent second redemption cannot
        // re-stamp used_at.
        let result = sqlx::query(
            r#"
            UPDATE device_invitations
            SET status = 'used', used_at = $2, used_by_fingerprint = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(invitation_id.as_uuid())
        .bind(used_at)
        .bind(used_by_fingerprint)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark invitation used: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "invitation is no longer pending".to_owned(),
            ));
        }

        Ok(())
    }

    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<DeviceInvitation>> {
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM device_invitations
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list invitations: {error}")))?;

        rows.into_iter().map(InvitationRow::into_invitation).collect()
    }

    async fn mark_expired_before(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE device_invitations
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to expire stale invitations: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}
