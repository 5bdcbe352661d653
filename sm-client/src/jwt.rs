//! Unverified JWT payload decode.
//!
//! The bearer is immediately presented back to the issuer over TLS on
//! every subsequent call; the only fields consumed here are `exp` and
//! `organization`. Do not add signature verification without also
//! provisioning the issuer's keys — see spec's design notes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
    organization: String,
}

/// `(exp, organization)` extracted from the bearer's payload segment,
/// without touching the signature segment at all.
pub(crate) fn decode_claims(jwt: &str) -> Result<(i64, String), Error> {
    let mut parts = jwt.split('.');
    let _header = parts.next().ok_or(Error::InvalidIdentityResponse)?;
    let payload_b64 = parts.next().ok_or(Error::InvalidIdentityResponse)?;
    // A well-formed JWT has exactly three dot-separated segments.
    if parts.next().is_none() {
        return Err(Error::InvalidIdentityResponse);
    }

    let payload_raw = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Error::InvalidIdentityResponse)?;
    let claims: Claims =
        serde_json::from_slice(&payload_raw).map_err(|_| Error::InvalidIdentityResponse)?;

    Ok((claims.exp, claims.organization))
}
