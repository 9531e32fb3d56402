//! PostgreSQL-backed staff profile and credential repository.
//!
//! Profiles and credentials share one `staff_profiles` table; the two port
//! views just select different column sets so listing screens never read
//! password material.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::{StaffCredentials, StaffRepository};
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{EmailAddress, StaffId, StaffNumber, StaffProfile, StaffRole};

/// Consecutive failed logins that trigger a temporary lockout.
const LOCKOUT_THRESHOLD: i32 = 5;

/// Lockout duration in minutes once the threshold is reached.
const LOCKOUT_MINUTES: i32 = 15;

/// PostgreSQL implementation of the staff repository port.
#[derive(Clone)]
pub struct PostgresStaffRepository {
    pool: PgPool,
}

impl PostgresStaffRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StaffProfileRow {
    id: Uuid,
    organization_id: Uuid,
    display_name: String,
    role: String,
    staff_number: String,
    email: String,
    is_active: bool,
    retired_at: Option<DateTime<Utc>>,
    password_setup_completed: bool,
}

impl StaffProfileRow {
    fn into_profile(self) -> AppResult<StaffProfile> {
        let role: StaffRole = self
            .role
            .parse()
            .map_err(|error| AppError::Internal(format!("stored staff row is invalid: {error}")))?;
        let staff_number = StaffNumber::new(self.staff_number)
            .map_err(|error| AppError::Internal(format!("stored staff row is invalid: {error}")))?;
        let email = EmailAddress::new(self.email)
            .map_err(|error| AppError::Internal(format!("stored staff row is invalid: {error}")))?;

        Ok(StaffProfile {
            id: StaffId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            display_name: self.display_name,
            role,
            staff_number,
            email,
            is_active: self.is_active,
            retired_at: self.retired_at,
            password_setup_completed: self.password_setup_completed,
        })
    }
}

#[derive(Debug, FromRow)]
struct StaffCredentialsRow {
    id: Uuid,
    organization_id: Uuid,
    password_hash: String,
    failed_login_count: i32,
    locked_until: Option<DateTime<Utc>>,
}

const PROFILE_COLUMNS: &str = r#"
    id,
    organization_id,
    display_name,
    role,
    staff_number,
    email,
    is_active,
    retired_at,
    password_setup_completed
"#;

#[async_trait]
impl StaffRepository for PostgresStaffRepository {
    async fn find_profile(&self, staff_id: StaffId) -> AppResult<Option<StaffProfile>> {
        let row = sqlx::query_as::<_, StaffProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM staff_profiles WHERE id = $1"
        ))
        .bind(staff_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find staff profile: {error}")))?;

        row.map(StaffProfileRow::into_profile).transpose()
    }

    async fn find_profile_by_email(
        &self,
        organization_id: OrganizationId,
        email: &str,
    ) -> AppResult<Option<StaffProfile>> {
        let row = sqlx::query_as::<_, StaffProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM staff_profiles WHERE organization_id = $1 AND email = $2"
        ))
        .bind(organization_id.as_uuid())
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find staff profile by email: {error}"))
        })?;

        row.map(StaffProfileRow::into_profile).transpose()
    }

    async fn find_credentials(&self, staff_id: StaffId) -> AppResult<Option<StaffCredentials>> {
        let row = sqlx::query_as::<_, StaffCredentialsRow>(
            r#"
            SELECT id, organization_id, password_hash, failed_login_count, locked_until
            FROM staff_profiles
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find staff credentials: {error}"))
        })?;

        Ok(row.map(|row| StaffCredentials {
            staff_id: StaffId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            password_hash: row.password_hash,
            failed_login_count: row.failed_login_count,
            locked_until: row.locked_until,
        }))
    }

    async fn create(&self, profile: &StaffProfile, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO staff_profiles (
                id,
                organization_id,
                display_name,
                role,
                staff_number,
                email,
                is_active,
                retired_at,
                password_setup_completed,
                password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(profile.organization_id.as_uuid())
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(profile.staff_number.as_str())
        .bind(profile.email.as_str())
        .bind(profile.is_active)
        .bind(profile.retired_at)
        .bind(profile.password_setup_completed)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create staff profile: {error}")))?;

        Ok(())
    }

    async fn update_profile(&self, profile: &StaffProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE staff_profiles
            SET
                display_name = $2,
                role = $3,
                staff_number = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(profile.staff_number.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update staff profile: {error}")))?;

        Ok(())
    }

    async fn update_password(
        &self,
        staff_id: StaffId,
        password_hash: &str,
        password_setup_completed: bool,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE staff_profiles
            SET
                password_hash = $2,
                password_setup_completed = $3,
                failed_login_count = 0,
                locked_until = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .bind(password_hash)
        .bind(password_setup_completed)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        Ok(())
    }

    async fn record_failed_login(&self, staff_id: StaffId) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE staff_profiles
            SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2
                    THEN now() + make_interval(mins => $3)
                    ELSE locked_until
                END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .bind(LOCKOUT_THRESHOLD)
        .bind(LOCKOUT_MINUTES)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record failed login: {error}")))?;

        Ok(())
    }

    async fn reset_failed_logins(&self, staff_id: StaffId) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE staff_profiles
            SET failed_login_count = 0, locked_until = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to reset failed logins: {error}")))?;

        Ok(())
    }

    async fn retire(&self, staff_id: StaffId, retired_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE staff_profiles
            SET is_active = FALSE, retired_at = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .bind(retired_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to retire staff profile: {error}")))?;

        Ok(())
    }

    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<StaffProfile>> {
        let rows = sqlx::query_as::<_, StaffProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM staff_profiles
            WHERE organization_id = $1
            ORDER BY is_active DESC, staff_number ASC
            "#
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list staff profiles: {error}")))?;

        rows.into_iter().map(StaffProfileRow::into_profile).collect()
    }

    async fn count_active_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM staff_profiles
            WHERE organization_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count active staff profiles: {error}"))
        })
    }
}
