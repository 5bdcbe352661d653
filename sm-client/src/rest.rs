//! REST Adapter: thin collaborator over the envelope.
//!
//! Consumes the bearer, organization key, org id, and region base URL.
//! Every returned secret's `key`/`value` fields are envelope-decrypted;
//! `create` envelope-encrypts the same fields before sending.

use chrono::{DateTime, Utc};
use sm_crypto::{Envelope, SymmetricKey};

use crate::error::Error;
use crate::models::{BitwardenSecret, CreateSecretRequest, RawSecret, SyncResponse};
use crate::region::Region;

pub struct RestAdapter {
    http: reqwest::Client,
    region: Region,
    org_id: String,
    org_enc_key: SymmetricKey,
}

impl RestAdapter {
    pub fn new(
        http: reqwest::Client,
        region: Region,
        org_id: String,
        org_enc_key: SymmetricKey,
    ) -> Self {
        Self {
            http,
            region,
            org_id,
            org_enc_key,
        }
    }

    pub async fn get_by_id(&self, bearer: &str, secret_id: &str) -> Result<BitwardenSecret, Error> {
        if secret_id.is_empty() {
            return Err(Error::InvalidArgument("secret id must not be empty".into()));
        }

        let url = format!("{}/secrets/{}", self.region.api_url, secret_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| Error::SendRequestError(e.to_string()))?;

        let response = map_status(response).await?;
        let raw: RawSecret = response
            .json()
            .await
            .map_err(|_| Error::SecretParseError)?;
        self.decrypt_secret(raw)
    }

    pub async fn sync(
        &self,
        bearer: &str,
        last_synced: DateTime<Utc>,
    ) -> Result<Vec<BitwardenSecret>, Error> {
        let url = format!(
            "{}/organizations/{}/secrets/sync",
            self.region.api_url, self.org_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .query(&[("lastSyncedDate", last_synced.to_rfc3339())])
            .send()
            .await
            .map_err(|e| Error::SendRequestError(e.to_string()))?;

        let response = map_status(response).await?;
        let body: SyncResponse = response
            .json()
            .await
            .map_err(|_| Error::SecretParseError)?;

        let raws = body.secrets.map(|s| s.data).unwrap_or_default();
        raws.into_iter().map(|r| self.decrypt_secret(r)).collect()
    }

    pub async fn create(
        &self,
        bearer: &str,
        key: &str,
        value: &str,
        note: &str,
        project_ids: &[String],
    ) -> Result<BitwardenSecret, Error> {
        if project_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "project_ids must be a non-empty list".into(),
            ));
        }

        let req = CreateSecretRequest {
            key: Envelope::encrypt(&self.org_enc_key, key.as_bytes())
                .map_err(|_| Error::SecretParseError)?
                .serialize(),
            value: Envelope::encrypt(&self.org_enc_key, value.as_bytes())
                .map_err(|_| Error::SecretParseError)?
                .serialize(),
            note: note.to_string(),
            project_ids: project_ids.to_vec(),
        };

        let url = format!(
            "{}/organizations/{}/secrets",
            self.region.api_url, self.org_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(bearer)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::SendRequestError(e.to_string()))?;

        let response = map_status(response).await?;
        let raw: RawSecret = response
            .json()
            .await
            .map_err(|_| Error::SecretParseError)?;
        self.decrypt_secret(raw)
    }

    fn decrypt_secret(&self, raw: RawSecret) -> Result<BitwardenSecret, Error> {
        let key = decrypt_field(&raw.key, &self.org_enc_key)?;
        let value = decrypt_field(&raw.value, &self.org_enc_key)?;
        Ok(BitwardenSecret {
            id: raw.id,
            organization_id: raw.organization_id,
            key,
            value,
            creation_date: raw.creation_date,
            revision_date: raw.revision_date,
        })
    }
}

fn decrypt_field(field: &str, key: &SymmetricKey) -> Result<String, Error> {
    let envelope = Envelope::parse(field).map_err(|_| Error::SecretParseError)?;
    let plaintext = envelope.decrypt(key).map_err(|_| Error::SecretParseError)?;
    String::from_utf8(plaintext).map_err(|_| Error::SecretParseError)
}

/// Shared status-code dispatch for every REST call, matching the
/// original's single `raise_errors` helper. On success, passes the
/// response through unconsumed so the caller can still read its body.
async fn map_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    match response.status().as_u16() {
        200..=299 => Ok(response),
        401 => Err(Error::Unauthorised),
        404 => Err(Error::NotFound),
        429 => Err(Error::RateLimited),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::ApiError { status, body })
        }
    }
}
