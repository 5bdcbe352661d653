//! Wire-shape models for the REST adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A secret as returned by the API, before field decryption.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSecret {
    pub id: String,
    pub organization_id: String,
    pub key: String,
    pub value: String,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

/// A secret with `key`/`value` decrypted to plaintext UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitwardenSecret {
    pub id: String,
    pub organization_id: String,
    pub key: String,
    pub value: String,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncResponse {
    #[serde(default)]
    pub secrets: Option<SyncSecrets>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncSecrets {
    #[serde(default)]
    pub data: Vec<RawSecret>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSecretRequest {
    pub key: String,
    pub value: String,
    pub note: String,
    #[serde(rename = "projectIds")]
    pub project_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdentityTokenResponse {
    pub access_token: String,
    pub encrypted_payload: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EncryptionKeyPayload {
    #[serde(rename = "encryptionKey")]
    pub encryption_key: String,
}
