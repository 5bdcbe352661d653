//! Identity, auth state, and REST adapter for the Secrets Manager client.
//!
//! [`SecretsClient`] is the public entry point: construct it with an
//! access token and a [`Region`], then call [`SecretsClient::get_by_id`],
//! [`SecretsClient::sync`], or [`SecretsClient::create`]. Internally this
//! ties together [`AuthState`] (bearer lifecycle, identity exchange,
//! state-file persistence) and [`RestAdapter`] (secret CRUD, field
//! envelope encryption/decryption).

mod access_token;
mod auth_state;
mod error;
mod identity;
mod jwt;
mod models;
mod region;
mod rest;

pub use access_token::AccessToken;
pub use auth_state::AuthState;
pub use error::Error;
pub use models::BitwardenSecret;
pub use region::Region;
pub use rest::RestAdapter;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Top-level client: bearer lifecycle plus secret CRUD.
///
/// Every call first lets [`AuthState`] refresh the bearer if it is within
/// the expiry skew window, then dispatches through a fresh [`RestAdapter`]
/// built from the current bearer and organization key.
pub struct SecretsClient {
    auth: AuthState,
}

impl SecretsClient {
    /// Parse `access_token`, then either restore from `state_file` or
    /// perform a fresh identity request against `region`.
    pub async fn new(
        access_token: &str,
        region: Region,
        state_file: Option<PathBuf>,
    ) -> Result<Self, Error> {
        let auth = AuthState::from_token(access_token, region, state_file).await?;
        Ok(Self { auth })
    }

    pub async fn get_by_id(&mut self, secret_id: &str) -> Result<BitwardenSecret, Error> {
        self.auth.reload_if_needed().await?;
        self.adapter().get_by_id(self.auth.bearer_token(), secret_id).await
    }

    pub async fn sync(&mut self, last_synced: DateTime<Utc>) -> Result<Vec<BitwardenSecret>, Error> {
        self.auth.reload_if_needed().await?;
        self.adapter().sync(self.auth.bearer_token(), last_synced).await
    }

    pub async fn create(
        &mut self,
        key: &str,
        value: &str,
        note: &str,
        project_ids: &[String],
    ) -> Result<BitwardenSecret, Error> {
        self.auth.reload_if_needed().await?;
        self.adapter()
            .create(self.auth.bearer_token(), key, value, note, project_ids)
            .await
    }

    fn adapter(&self) -> RestAdapter {
        RestAdapter::new(
            reqwest::Client::new(),
            self.auth.region().clone(),
            self.auth.org_id().to_string(),
            self.auth.org_enc_key().clone(),
        )
    }
}
