//! Symmetric Key: a 32/64-byte encryption+MAC key pair for the envelope.

extern crate alloc;
use alloc::vec::Vec;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// One half of an encrypt-then-MAC keypair.
///
/// `enc_key` and `mac_key` are always the same length: 16 bytes (AES128) or
/// 32 bytes (AES256), split from a single 32- or 64-byte input.
#[derive(Clone)]
pub struct SymmetricKey {
    enc_key: Vec<u8>,
    mac_key: Vec<u8>,
}

impl core::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("enc_key", &"<redacted>")
            .field("mac_key", &"<redacted>")
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.enc_key.zeroize();
        self.mac_key.zeroize();
    }
}

impl SymmetricKey {
    /// Build a key from raw material. `raw` must be 32 or 64 bytes, split in
    /// half into `(enc_key, mac_key)`.
    pub fn construct(raw: &[u8]) -> Result<Self, Error> {
        match raw.len() {
            64 => Ok(Self {
                enc_key: raw[..32].to_vec(),
                mac_key: raw[32..64].to_vec(),
            }),
            32 => Ok(Self {
                enc_key: raw[..16].to_vec(),
                mac_key: raw[16..32].to_vec(),
            }),
            _ => Err(Error::InvalidKeyLength),
        }
    }

    /// Derive a 64-byte key (split 32/32) via `HMAC-SHA256` + `HKDF-Expand`.
    ///
    /// `seed` must be exactly 16 bytes. `prk = HMAC-SHA256(key="bitwarden-"
    /// || name, msg=seed)`, then `okm = HKDF-Expand(SHA-256, prk, info, 64)`.
    pub fn derive(seed: &[u8], name: &str, info: &str) -> Result<Self, Error> {
        if seed.len() != 16 {
            return Err(Error::BadSeed);
        }

        let mut key_material = Vec::with_capacity(10 + name.len());
        key_material.extend_from_slice(b"bitwarden-");
        key_material.extend_from_slice(name.as_bytes());

        let mut mac = HmacSha256::new_from_slice(&key_material).map_err(|_| Error::BadSeed)?;
        mac.update(seed);
        let prk = mac.finalize().into_bytes();

        let hk = Hkdf::<Sha256>::from_prk(&prk).map_err(|_| Error::BadSeed)?;
        let mut okm = [0u8; 64];
        hk.expand(info.as_bytes(), &mut okm)
            .map_err(|_| Error::BadSeed)?;

        Self::construct(&okm)
    }

    /// Shorthand for `derive(seed, "accesstoken", "sm-access-token")`.
    pub fn from_access_seed(seed: &[u8]) -> Result<Self, Error> {
        Self::derive(seed, "accesstoken", "sm-access-token")
    }

    pub fn enc_key(&self) -> &[u8] {
        &self.enc_key
    }

    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }

    /// `base64(enc_key || mac_key)`.
    pub fn to_base64(&self) -> alloc::string::String {
        let mut combined = Vec::with_capacity(self.enc_key.len() + self.mac_key.len());
        combined.extend_from_slice(&self.enc_key);
        combined.extend_from_slice(&self.mac_key);
        STANDARD.encode(combined)
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.enc_key == other.enc_key && self.mac_key == other.mac_key
    }
}

impl Eq for SymmetricKey {}
