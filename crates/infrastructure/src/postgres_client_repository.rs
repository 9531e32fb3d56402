//! PostgreSQL-backed client record repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use bloomconnect_application::ClientRepository;
use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{Client, ClientId};

/// PostgreSQL implementation of the client repository port.
#[derive(Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    organization_id: Uuid,
    display_name: String,
    phonetic_name: Option<String>,
    birth_date: Option<NaiveDate>,
    care_notes: Option<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            display_name: row.display_name,
            phonetic_name: row.phonetic_name,
            birth_date: row.birth_date,
            care_notes: row.care_notes,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
        }
    }
}

const CLIENT_COLUMNS: &str = r#"
    id,
    organization_id,
    display_name,
    phonetic_name,
    birth_date,
    care_notes,
    is_active,
    deleted_at
"#;

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn find_by_id(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find client: {error}")))?;

        Ok(row.map(Client::from))
    }

    async fn create(&self, client: &Client) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id,
                organization_id,
                display_name,
                phonetic_name,
                birth_date,
                care_notes,
                is_active,
                deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(client.organization_id.as_uuid())
        .bind(&client.display_name)
        .bind(&client.phonetic_name)
        .bind(client.birth_date)
        .bind(&client.care_notes)
        .bind(client.is_active)
        .bind(client.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create client: {error}")))?;

        Ok(())
    }

    async fn update(&self, client: &Client) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE clients
            SET
                display_name = $2,
                phonetic_name = $3,
                birth_date = $4,
                care_notes = $5,
                is_active = $6,
                deleted_at = $7,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.display_name)
        .bind(&client.phonetic_name)
        .bind(client.birth_date)
        .bind(&client.care_notes)
        .bind(client.is_active)
        .bind(client.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update client: {error}")))?;

        Ok(())
    }

    async fn list_active_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE organization_id = $1 AND is_active = TRUE
            ORDER BY phonetic_name ASC NULLS LAST, display_name ASC
            "#
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list clients: {error}")))?;

        Ok(rows.into_iter().map(Client::from).collect())
    }
}
