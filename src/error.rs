//! Error types for the envelope and key-derivation core.

use core::fmt;

/// Crypto error kinds (spec.md §7, Crypto group). The Token group lives in
/// `sm_client::Error` instead, since access-token parsing is a `sm-client`
/// concern; nothing in this crate constructs a token-shaped error.
///
/// Flat on purpose: callers match on the variant, never on an inheritance
/// chain, and crypto failures never carry key or plaintext material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Symmetric key material was not 32 or 64 bytes.
    InvalidKeyLength,
    /// HKDF seed was not exactly 16 bytes.
    BadSeed,
    /// Envelope string failed to parse: wrong version, wrong part count,
    /// wrong field length, or non-base64 payload.
    InvalidEnvelope,
    /// PKCS#7 unpadding failed after a successful MAC check.
    InvalidPadding,
    /// HMAC verification failed. Checked before ciphertext is touched.
    MacMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength => write!(f, "invalid key length"),
            Self::BadSeed => write!(f, "seed must be exactly 16 bytes"),
            Self::InvalidEnvelope => write!(f, "invalid envelope format"),
            Self::InvalidPadding => write!(f, "invalid PKCS#7 padding"),
            Self::MacMismatch => write!(f, "MAC verification failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
