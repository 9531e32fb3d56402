//! Client (care recipient) record management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use bloomconnect_core::{AppError, AppResult, OrganizationId};
use bloomconnect_domain::{AuditAction, Client, ClientId};

use crate::{AuditEvent, AuditService};

/// Repository port for client record persistence.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Finds a client by its identifier.
    async fn find_by_id(&self, client_id: ClientId) -> AppResult<Option<Client>>;

    /// Persists a new client record.
    async fn create(&self, client: &Client) -> AppResult<()>;

    /// Updates an existing client record.
    async fn update(&self, client: &Client) -> AppResult<()>;

    /// Lists active clients in an organization, sorted by phonetic name.
    async fn list_active_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Client>>;
}

/// Fields for creating a client record.
pub struct ClientInput {
    /// Display name.
    pub display_name: String,
    /// Phonetic reading of the name.
    pub phonetic_name: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Free-form care notes.
    pub care_notes: Option<String>,
}

/// Partial update for a client record. `None` fields are left untouched.
#[derive(Default)]
pub struct ClientUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New phonetic reading; `Some(None)` clears the stored value.
    pub phonetic_name: Option<Option<String>>,
    /// New date of birth; `Some(None)` clears the stored value.
    pub birth_date: Option<Option<NaiveDate>>,
    /// New care notes; `Some(None)` clears the stored value.
    pub care_notes: Option<Option<String>>,
}

/// Application service for client records.
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
    audit_service: AuditService,
}

impl ClientService {
    /// Creates a new client service.
    #[must_use]
    pub fn new(repository: Arc<dyn ClientRepository>, audit_service: AuditService) -> Self {
        Self {
            repository,
            audit_service,
        }
    }

    /// Creates a client record in the caller's organization.
    pub async fn create(
        &self,
        organization_id: OrganizationId,
        input: ClientInput,
        acting_subject: &str,
    ) -> AppResult<Client> {
        let display_name = input.display_name.trim().to_owned();
        if display_name.is_empty() {
            return Err(AppError::Validation(
                "client name must not be empty".to_owned(),
            ));
        }

        if let Some(birth_date) = input.birth_date
            && birth_date > Utc::now().date_naive()
        {
            return Err(AppError::Validation(
                "birth date must not be in the future".to_owned(),
            ));
        }

        let client = Client {
            id: ClientId::new(),
            organization_id,
            display_name,
            phonetic_name: input.phonetic_name,
            birth_date: input.birth_date,
            care_notes: input.care_notes,
            is_active: true,
            deleted_at: None,
        };

        self.repository.create(&client).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::ClientCreated,
                resource_type: "client".to_owned(),
                resource_id: client.id.to_string(),
                detail: None,
            })
            .await?;

        Ok(client)
    }

    /// Returns one active client, scoped to the caller's organization.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Client> {
        let client = self
            .repository
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("client not found".to_owned()))?;

        if client.organization_id != organization_id || !client.is_active {
            return Err(AppError::NotFound("client not found".to_owned()));
        }

        Ok(client)
    }

    /// Lists active clients in the organization.
    pub async fn list(&self, organization_id: OrganizationId) -> AppResult<Vec<Client>> {
        self.repository
            .list_active_for_organization(organization_id)
            .await
    }

    /// Applies a partial update to an active client record.
    pub async fn update(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
        update: ClientUpdate,
        acting_subject: &str,
    ) -> AppResult<Client> {
        let mut client = self.get(organization_id, client_id).await?;

        if let Some(display_name) = update.display_name {
            let trimmed = display_name.trim();
            if trimmed.is_empty() {
                return Err(AppError::Validation(
                    "client name must not be empty".to_owned(),
                ));
            }
            client.display_name = trimmed.to_owned();
        }

        if let Some(phonetic_name) = update.phonetic_name {
            client.phonetic_name = phonetic_name;
        }

        if let Some(birth_date) = update.birth_date {
            if let Some(date) = birth_date
                && date > Utc::now().date_naive()
            {
                return Err(AppError::Validation(
                    "birth date must not be in the future".to_owned(),
                ));
            }
            client.birth_date = birth_date;
        }

        if let Some(care_notes) = update.care_notes {
            client.care_notes = care_notes;
        }

        self.repository.update(&client).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::ClientUpdated,
                resource_type: "client".to_owned(),
                resource_id: client_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(client)
    }

    /// Soft-deletes a client record.
    pub async fn delete(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
        acting_subject: &str,
    ) -> AppResult<()> {
        let mut client = self.get(organization_id, client_id).await?;

        client.is_active = false;
        client.deleted_at = Some(Utc::now());
        self.repository.update(&client).await?;

        self.audit_service
            .append_event(AuditEvent {
                organization_id,
                subject: acting_subject.to_owned(),
                action: AuditAction::ClientDeleted,
                resource_type: "client".to_owned(),
                resource_id: client_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};

    struct FakeClientRepository {
        clients: Mutex<Vec<Client>>,
    }

    impl FakeClientRepository {
        fn new() -> Self {
            Self {
                clients: Mutex::new(Vec::new()),
            }
        }

        fn with(client: Client) -> Self {
            Self {
                clients: Mutex::new(vec![client]),
            }
        }
    }

    #[async_trait]
    impl ClientRepository for FakeClientRepository {
        async fn find_by_id(&self, client_id: ClientId) -> AppResult<Option<Client>> {
            let clients = self
                .clients
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(clients.iter().find(|client| client.id == client_id).cloned())
        }

        async fn create(&self, client: &Client) -> AppResult<()> {
            let mut clients = self
                .clients
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            clients.push(client.clone());
            Ok(())
        }

        async fn update(&self, client: &Client) -> AppResult<()> {
            let mut clients = self
                .clients
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            if let Some(stored) = clients.iter_mut().find(|stored| stored.id == client.id) {
                *stored = client.clone();
            }
            Ok(())
        }

        async fn list_active_for_organization(
            &self,
            organization_id: OrganizationId,
        ) -> AppResult<Vec<Client>> {
            let clients = self
                .clients
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            Ok(clients
                .iter()
                .filter(|client| client.organization_id == organization_id && client.is_active)
                .cloned()
                .collect())
        }
    }

    struct NullAuditRepository;

    #[async_trait]
    impl AuditRepository for NullAuditRepository {
        async fn append_event(&self, _event: AuditEvent) -> AppResult<()> {
            Ok(())
        }
    }

    struct NullAuditLogRepository;

    #[async_trait]
    impl AuditLogRepository for NullAuditLogRepository {
        async fn list_recent_entries(
            &self,
            _organization_id: OrganizationId,
            _query: AuditLogQuery,
        ) -> AppResult<Vec<AuditLogEntry>> {
            Ok(Vec::new())
        }
    }

    fn service_with(repository: FakeClientRepository) -> ClientService {
        ClientService::new(
            Arc::new(repository),
            AuditService::new(Arc::new(NullAuditRepository), Arc::new(NullAuditLogRepository)),
        )
    }

    fn active_client(organization_id: OrganizationId) -> Client {
        Client {
            id: ClientId::new(),
            organization_id,
            display_name: "Haruko Yamada".to_owned(),
            phonetic_name: Some("やまだ はるこ".to_owned()),
            birth_date: NaiveDate::from_ymd_opt(1942, 3, 15),
            care_notes: None,
            is_active: true,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn created_client_is_listed() {
        let organization_id = OrganizationId::new();
        let service = service_with(FakeClientRepository::new());

        let created = service
            .create(
                organization_id,
                ClientInput {
                    display_name: "Haruko Yamada".to_owned(),
                    phonetic_name: None,
                    birth_date: None,
                    care_notes: None,
                },
                "staff-1",
            )
            .await;
        assert!(created.is_ok());

        let listed = service.list(organization_id).await;
        assert!(matches!(listed, Ok(ref clients) if clients.len() == 1));
    }

    #[tokio::test]
    async fn future_birth_date_is_rejected() {
        let organization_id = OrganizationId::new();
        let service = service_with(FakeClientRepository::new());

        let result = service
            .create(
                organization_id,
                ClientInput {
                    display_name: "Haruko Yamada".to_owned(),
                    phonetic_name: None,
                    birth_date: (Utc::now().date_naive()).succ_opt(),
                    care_notes: None,
                },
                "staff-1",
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn deleted_client_reads_as_missing() {
        let organization_id = OrganizationId::new();
        let client = active_client(organization_id);
        let client_id = client.id;
        let service = service_with(FakeClientRepository::with(client));

        assert!(service.delete(organization_id, client_id, "staff-1").await.is_ok());

        let lookup = service.get(organization_id, client_id).await;
        assert!(matches!(lookup, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_clears_optional_field_when_asked() {
        let organization_id = OrganizationId::new();
        let client = active_client(organization_id);
        let client_id = client.id;
        let service = service_with(FakeClientRepository::with(client));

        let updated = service
            .update(
                organization_id,
                client_id,
                ClientUpdate {
                    phonetic_name: Some(None),
                    ..ClientUpdate::default()
                },
                "staff-1",
            )
            .await;

        assert!(matches!(
            updated,
            Ok(ref client) if client.phonetic_name.is_none()
        ));
    }

    #[tokio::test]
    async fn cross_tenant_lookup_reads_as_missing() {
        let client = active_client(OrganizationId::new());
        let client_id = client.id;
        let service = service_with(FakeClientRepository::with(client));

        let lookup = service.get(OrganizationId::new(), client_id).await;
        assert!(matches!(lookup, Err(AppError::NotFound(_))));
    }
}
