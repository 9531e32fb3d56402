//! PostgreSQL-backed notification repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::NotificationRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{Notification, NotificationId, StaffId, StaffRole};

/// PostgreSQL implementation of the notification repository port.
#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    body: String,
    target_role: Option<String>,
    created_at: DateTime<Utc>,
    created_by: Uuid,
}

impl NotificationRow {
    fn into_notification(self) -> AppResult<Notification> {
        let target_role = self
            .target_role
            .map(|role| role.parse::<StaffRole>())
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("stored notification row is invalid: {error}"))
            })?;

        Ok(Notification {
            id: NotificationId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            title: self.title,
            body: self.body,
            target_role,
            created_at: self.created_at,
            created_by: StaffId::from_uuid(self.created_by),
        })
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, organization_id, title, body, target_role, created_at, created_by";

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id,
                organization_id,
                title,
                body,
                target_role,
                created_at,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.organization_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.target_role.map(|role| role.as_str()))
        .bind(notification.created_at)
        .bind(notification.created_by.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert notification: {error}")))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        notification_id: NotificationId,
    ) -> AppResult<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(notification_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find notification: {error}")))?;

        row.map(NotificationRow::into_notification).transpose()
    }

    async fn list_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list notifications: {error}")))?;

        rows.into_iter().map(NotificationRow::into_notification).collect()
    }

    async fn delete(&self, notification_id: NotificationId) -> AppResult<()> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(notification_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete notification: {error}"))
            })?;

        Ok(())
    }
}
