//! Auth State: bootstraps, restores, refreshes, and persists identity.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde_json::json;
use sm_crypto::{Envelope, SymmetricKey};

use crate::access_token::AccessToken;
use crate::error::Error;
use crate::identity::{IdentityClient, IdentityResponse};
use crate::region::Region;

/// Safety margin (seconds) subtracted from `exp` before treating a bearer
/// as still fresh.
const SKEW_SECONDS: i64 = 30;

/// Orchestrates the access token, bearer, and organization key. Produces
/// the bearer header and organization key consumed by the REST adapter.
pub struct AuthState {
    region: Region,
    access_token: AccessToken,
    bearer: String,
    org_id: String,
    org_enc_key: SymmetricKey,
    exp: i64,
    state_file: Option<PathBuf>,
    identity: IdentityClient,
}

impl AuthState {
    /// Parse the token, then either restore from `state_file` or perform a
    /// fresh identity request, persisting afterward if `state_file` is set.
    ///
    /// The whole of token parse, state-file attempt, and identity fallback
    /// runs inside one debug span; `skip_all` keeps the token string (it
    /// carries the client secret) out of the span's recorded fields.
    #[tracing::instrument(level = "debug", name = "auth_state_from_token", skip_all)]
    pub async fn from_token(
        token_str: &str,
        region: Region,
        state_file: Option<PathBuf>,
    ) -> Result<Self, Error> {
        let access_token = AccessToken::parse(token_str)?;
        let identity = IdentityClient::new(reqwest::Client::new());

        let restored = match &state_file {
            Some(path) => restore(path, access_token.seed_key()).await.ok(),
            None => None,
        };

        let resp = match restored {
            Some(resp) => resp,
            None => {
                tracing::debug!("no usable state file, requesting fresh identity");
                let raw = identity.request(&region, &access_token).await?;
                let resp = IdentityClient::finalize(raw, access_token.seed_key())?;
                if let Some(path) = &state_file {
                    if let Err(e) = persist(path, &resp, access_token.seed_key()).await {
                        tracing::warn!(error = %e, "failed to persist auth state");
                    }
                }
                resp
            }
        };

        Ok(Self {
            region,
            access_token,
            bearer: resp.bearer,
            org_id: resp.org_id,
            org_enc_key: resp.org_enc_key,
            exp: resp.exp,
            state_file,
            identity,
        })
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn org_enc_key(&self) -> &SymmetricKey {
        &self.org_enc_key
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    fn is_fresh(&self) -> bool {
        Utc::now().timestamp() + SKEW_SECONDS < self.exp
    }

    /// Re-run identity + persist if the bearer is within the skew window
    /// of expiry. Bearer and organization key update atomically: either
    /// both reflect the new response or neither does.
    pub async fn reload_if_needed(&mut self) -> Result<(), Error> {
        if self.is_fresh() {
            return Ok(());
        }

        tracing::debug!("bearer stale, refreshing identity");
        let raw = self.identity.request(&self.region, &self.access_token).await?;
        let resp = IdentityClient::finalize(raw, self.access_token.seed_key())?;

        if let Some(path) = self.state_file.clone() {
            if let Err(e) = persist(&path, &resp, self.access_token.seed_key()).await {
                tracing::warn!(error = %e, "failed to persist auth state");
            }
        }

        self.bearer = resp.bearer;
        self.org_id = resp.org_id;
        self.org_enc_key = resp.org_enc_key;
        self.exp = resp.exp;
        Ok(())
    }
}

/// Read `<envelope>|<bearer>` from `path`. Disambiguates by splitting on
/// the LAST `|`: the envelope's own two internal `|` separators are
/// preserved, and the final `|` is the bearer boundary. Any failure here
/// is caught by the caller and downgraded to a fresh identity request —
/// the state file is advisory cache, not authority.
async fn restore(path: &Path, access_token_key: &SymmetricKey) -> Result<IdentityResponse, Error> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| Error::InvalidStateFile)?;
    if contents.is_empty() {
        return Err(Error::InvalidStateFile);
    }

    let (envelope_str, bearer) = contents
        .trim_end()
        .rsplit_once('|')
        .ok_or(Error::InvalidStateFile)?;

    let envelope = Envelope::parse(envelope_str).map_err(|_| Error::InvalidStateFile)?;
    let plaintext = envelope
        .decrypt(access_token_key)
        .map_err(|_| Error::InvalidStateFile)?;

    #[derive(serde::Deserialize)]
    struct Payload {
        #[serde(rename = "encryptionKey")]
        encryption_key: String,
    }
    let payload: Payload =
        serde_json::from_slice(&plaintext).map_err(|_| Error::InvalidStateFile)?;
    let org_key_bytes = STANDARD
        .decode(&payload.encryption_key)
        .map_err(|_| Error::InvalidStateFile)?;
    if org_key_bytes.len() != 64 {
        return Err(Error::InvalidStateFile);
    }
    let org_enc_key = SymmetricKey::construct(&org_key_bytes).map_err(|_| Error::InvalidStateFile)?;

    let (exp, org_id) = crate::jwt::decode_claims(bearer).map_err(|_| Error::InvalidStateFile)?;

    tracing::trace!("restored auth state from state file");

    Ok(IdentityResponse {
        bearer: bearer.to_string(),
        org_enc_key,
        org_id,
        exp,
    })
}

/// Atomic write: temp file beside `path`, then rename over the target.
async fn persist(
    path: &Path,
    resp: &IdentityResponse,
    access_token_key: &SymmetricKey,
) -> Result<(), Error> {
    let plaintext = json!({ "encryptionKey": resp.org_enc_key.to_base64() }).to_string();

    let envelope = Envelope::encrypt(access_token_key, plaintext.as_bytes())
        .map_err(|_| Error::InvalidStateFile)?;
    let contents = format!("{}|{}", envelope.serialize(), resp.bearer);

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &contents)
        .await
        .map_err(|e| Error::SendRequestError(format!("state file write: {e}")))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| Error::SendRequestError(format!("state file rename: {e}")))?;

    tracing::trace!("persisted auth state to state file");
    Ok(())
}
