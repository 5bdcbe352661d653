//! Access Token: the user-visible credential string.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sm_crypto::SymmetricKey;

use crate::error::Error;

/// `"0.<access_token_id>.<client_secret>:<base64-16-byte-seed>"`, parsed
/// once at client construction and immutable thereafter.
pub struct AccessToken {
    access_token_id: String,
    client_secret: String,
    seed_key: SymmetricKey,
}

impl AccessToken {
    /// Parse the token string. Version `"0"` only; any other leading
    /// component before the first `.` fails `UnsupportedTokenVersion`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (version, rest) = s.split_once('.').ok_or(Error::InvalidToken)?;
        if version != "0" {
            return Err(Error::UnsupportedTokenVersion);
        }

        let (id_and_secret, b64_seed) = rest.split_once(':').ok_or(Error::InvalidToken)?;
        let (access_token_id, client_secret) =
            id_and_secret.split_once('.').ok_or(Error::InvalidToken)?;

        let seed = STANDARD
            .decode(b64_seed)
            .map_err(|_| Error::InvalidToken)?;
        if seed.len() != 16 {
            return Err(Error::InvalidToken);
        }

        let seed_key = SymmetricKey::from_access_seed(&seed).map_err(|_| Error::InvalidToken)?;

        Ok(Self {
            access_token_id: access_token_id.to_string(),
            client_secret: client_secret.to_string(),
            seed_key,
        })
    }

    pub fn access_token_id(&self) -> &str {
        &self.access_token_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn seed_key(&self) -> &SymmetricKey {
        &self.seed_key
    }
}
