use bloomconnect_domain::Client;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for creating a client record.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-client-request.ts"
)]
pub struct CreateClientRequest {
    pub display_name: String,
    pub phonetic_name: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub care_notes: Option<String>,
}

/// Incoming payload for a partial client update.
///
/// Omitted fields are untouched; an explicit `null` clears the stored value.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-client-request.ts"
)]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub phonetic_name: Option<Option<String>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub care_notes: Option<Option<String>>,
}

/// API representation of a client record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-response.ts"
)]
pub struct ClientResponse {
    pub id: String,
    pub display_name: String,
    pub phonetic_name: Option<String>,
    pub birth_date: Option<String>,
    pub care_notes: Option<String>,
    pub is_active: bool,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.to_string(),
            display_name: client.display_name,
            phonetic_name: client.phonetic_name,
            birth_date: client.birth_date.map(|date| date.to_string()),
            care_notes: client.care_notes,
            is_active: client.is_active,
        }
    }
}
