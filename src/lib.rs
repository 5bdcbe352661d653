//! # sm-crypto
//!
//! The cryptographic envelope and key-derivation core for the Secrets
//! Manager client SDK: an authenticated symmetric-encryption format
//! (encrypt-then-MAC, AES-CBC + HMAC-SHA256, PKCS#7 padding) plus the
//! HKDF-based routines that bind a user-visible access token to a
//! symmetric key.
//!
//! ## Quick start
//!
//! ```
//! use sm_crypto::{Envelope, SymmetricKey};
//!
//! let key = SymmetricKey::construct(&[0u8; 64]).unwrap();
//! let envelope = Envelope::encrypt(&key, b"secret value").unwrap();
//! let plaintext = envelope.decrypt(&key).unwrap();
//! assert_eq!(plaintext, b"secret value");
//! ```
//!
//! ## What's NOT provided
//!
//! - A general-purpose crypto library (no arbitrary cipher suites)
//! - KMS/HSM integration
//! - Secret lifecycle management (that's `sm-client`)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod envelope;
mod error;
mod symmetric_key;

pub use envelope::{Algorithm, Envelope};
pub use error::Error;
pub use symmetric_key::SymmetricKey;
