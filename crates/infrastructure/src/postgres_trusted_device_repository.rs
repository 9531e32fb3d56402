//! PostgreSQL-backed trusted device repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::TrustedDeviceRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{StaffId, TrustedDevice, TrustedDeviceId};

/// PostgreSQL implementation of the trusted device repository port.
#[derive(Clone)]
pub struct PostgresTrustedDeviceRepository {
    pool: PgPool,
}

impl PostgresTrustedDeviceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TrustedDeviceRow {
    id: Uuid,
    staff_id: Uuid,
    organization_id: Uuid,
    fingerprint_digest: String,
    pin_hash: Option<String>,
    biometric_credential_id: Option<String>,
    last_used_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

impl From<TrustedDeviceRow> for TrustedDevice {
    fn from(row: TrustedDeviceRow) -> Self {
        Self {
            id: TrustedDeviceId::from_uuid(row.id),
            staff_id: StaffId::from_uuid(row.staff_id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            fingerprint_digest: row.fingerprint_digest,
            pin_hash: row.pin_hash,
            biometric_credential_id: row.biometric_credential_id,
            last_used_at: row.last_used_at,
            expires_at: row.expires_at,
        }
    }
}

const DEVICE_COLUMNS: &str = r#"
    id,
    staff_id,
    organization_id,
    fingerprint_digest,
    pin_hash,
    biometric_credential_id,
    last_used_at,
    expires_at
"#;

#[async_trait]
impl TrustedDeviceRepository for PostgresTrustedDeviceRepository {
    async fn find_by_fingerprint_digest(&self, digest: &str) -> AppResult<Option<TrustedDevice>> {
        let row = sqlx::query_as::<_, TrustedDeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM trusted_devices WHERE fingerprint_digest = $1"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find trusted device: {error}"))
        })?;

        Ok(row.map(TrustedDevice::from))
    }

    async fn register(&self, device: &TrustedDevice) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trusted_devices (
                id,
                staff_id,
                organization_id,
                fingerprint_digest,
                pin_hash,
                biometric_credential_id,
                last_used_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(device.id.as_uuid())
        .bind(device.staff_id.as_uuid())
        .bind(device.organization_id.as_uuid())
        .bind(&device.fingerprint_digest)
        .bind(&device.pin_hash)
        .bind(&device.biometric_credential_id)
        .bind(device.last_used_at)
        .bind(device.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to register trusted device: {error}"))
        })?;

        Ok(())
    }

    async fn record_login(&self, device_id: TrustedDeviceId, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE trusted_devices
            SET last_used_at = $2
            WHERE id = $1
            "#,
        )
        .bind(device_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record device login: {error}"))
        })?;

        Ok(())
    }

    async fn revoke(&self, device_id: TrustedDeviceId) -> AppResult<()> {
        sqlx::query("DELETE FROM trusted_devices WHERE id = $1")
            .bind(device_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to revoke trusted device: {error}"))
            })?;

        Ok(())
    }

    async fn list_for_staff(&self, staff_id: StaffId) -> AppResult<Vec<TrustedDevice>> {
        let rows = sqlx::query_as::<_, TrustedDeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM trusted_devices
            WHERE staff_id = $1
            ORDER BY expires_at DESC
            "#
        ))
        .bind(staff_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list trusted devices: {error}"))
        })?;

        Ok(rows.into_iter().map(TrustedDevice::from).collect())
    }

    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<TrustedDevice>> {
        let rows = sqlx::query_as::<_, TrustedDeviceRow>(&format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM trusted_devices
            WHERE organization_id = $1
            ORDER BY expires_at DESC
            "#
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list trusted devices: {error}"))
        })?;

        Ok(rows.into_iter().map(TrustedDevice::from).collect())
    }
}
