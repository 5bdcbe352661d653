//! Identity Client: exchanges an access token for a bearer + org key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sm_crypto::{Envelope, SymmetricKey};

use crate::access_token::AccessToken;
use crate::error::Error;
use crate::jwt;
use crate::models::{EncryptionKeyPayload, IdentityTokenResponse};
use crate::region::Region;

/// Result of a successful identity exchange.
pub struct IdentityResponse {
    pub bearer: String,
    pub org_enc_key: SymmetricKey,
    pub org_id: String,
    pub exp: i64,
}

pub struct IdentityClient {
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST client-credentials to `{region.identity_url}/connect/token`.
    pub async fn request(
        &self,
        region: &Region,
        access_token: &AccessToken,
    ) -> Result<IdentityTokenResponse, Error> {
        let url = format!("{}/connect/token", region.identity_url);
        let body = format!(
            "scope=api.secrets&grant_type=client_credentials&client_id={}&client_secret={}",
            access_token.access_token_id(),
            access_token.client_secret(),
        );

        tracing::debug!(url = %url, "dispatching identity request");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .header("Device-Type", "21")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::SendRequestError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<IdentityTokenResponse>()
                .await
                .map_err(|_| Error::InvalidIdentityResponse)
        } else if status.as_u16() == 400 || status.as_u16() == 401 {
            tracing::warn!(status = status.as_u16(), "identity request unauthorised");
            Err(Error::UnauthorisedToken)
        } else if status.as_u16() == 429 {
            tracing::warn!("identity request rate limited");
            Err(Error::RateLimited)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "identity request failed");
            Err(Error::ApiError {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Decrypt the encrypted payload and extract `(bearer, org_enc_key,
    /// org_id, exp)`. Any crypto or shape failure collapses to
    /// `InvalidIdentityResponse` — the access-token holder cannot usefully
    /// distinguish these causes.
    pub fn finalize(
        resp: IdentityTokenResponse,
        access_token_key: &SymmetricKey,
    ) -> Result<IdentityResponse, Error> {
        let envelope = Envelope::parse(&resp.encrypted_payload)?;
        let plaintext = envelope.decrypt(access_token_key)?;

        let payload: EncryptionKeyPayload =
            serde_json::from_slice(&plaintext).map_err(|_| Error::InvalidIdentityResponse)?;
        let org_key_bytes = STANDARD
            .decode(&payload.encryption_key)
            .map_err(|_| Error::InvalidIdentityResponse)?;
        if org_key_bytes.len() != 64 {
            return Err(Error::InvalidIdentityResponse);
        }
        let org_enc_key = SymmetricKey::construct(&org_key_bytes)?;

        let (exp, org_id) = jwt::decode_claims(&resp.access_token)?;

        Ok(IdentityResponse {
            bearer: resp.access_token,
            org_enc_key,
            org_id,
            exp,
        })
    }
}
