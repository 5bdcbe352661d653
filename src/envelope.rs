//! Encrypted Envelope: `"[<ver>.]<b64-iv>|<b64-ct>|<b64-mac>"`.
//!
//! Encrypt-then-MAC: AES-CBC for confidentiality, HMAC-SHA256 over
//! `iv || ciphertext` for integrity. The algorithm tag is informational
//! only — it is not covered by the MAC (a compatibility wart inherited
//! from the wire protocol, not a bug).

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use getrandom::getrandom;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::Error;
use crate::symmetric_key::SymmetricKey;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

const IV_LEN: usize = 16;
const MAC_LEN: usize = 32;

/// Algorithm tag carried by the envelope's optional version prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Version `"1"`, or no prefix at all.
    Aes128CbcHmacSha256,
    /// Version `"2"`.
    Aes256CbcHmacSha256,
}

impl Algorithm {
    fn version_tag(self) -> &'static str {
        match self {
            Self::Aes128CbcHmacSha256 => "1",
            Self::Aes256CbcHmacSha256 => "2",
        }
    }

    fn from_version_tag(tag: &str) -> Result<Self, Error> {
        match tag {
            "1" => Ok(Self::Aes128CbcHmacSha256),
            "2" => Ok(Self::Aes256CbcHmacSha256),
            _ => Err(Error::InvalidEnvelope),
        }
    }
}

/// A parsed/constructed envelope. Never retains key material.
#[derive(Clone)]
pub struct Envelope {
    algo: Algorithm,
    iv: [u8; IV_LEN],
    ct: Vec<u8>,
    mac: [u8; MAC_LEN],
}

impl Envelope {
    /// Parse `"[<ver>.]<b64-iv>|<b64-ct>|<b64-mac>"`.
    ///
    /// Missing version prefix defaults to AES128. Any size, base64, or
    /// version violation fails `InvalidEnvelope`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (algo, rest) = match s.split_once('.') {
            Some((ver, rest)) => (Algorithm::from_version_tag(ver)?, rest),
            None => (Algorithm::Aes128CbcHmacSha256, s),
        };

        let mut parts = rest.split('|');
        let iv_b64 = parts.next().ok_or(Error::InvalidEnvelope)?;
        let ct_b64 = parts.next().ok_or(Error::InvalidEnvelope)?;
        let mac_b64 = parts.next().ok_or(Error::InvalidEnvelope)?;
        if parts.next().is_some() {
            return Err(Error::InvalidEnvelope);
        }

        let iv_raw = STANDARD.decode(iv_b64).map_err(|_| Error::InvalidEnvelope)?;
        let ct = STANDARD.decode(ct_b64).map_err(|_| Error::InvalidEnvelope)?;
        let mac_raw = STANDARD.decode(mac_b64).map_err(|_| Error::InvalidEnvelope)?;

        if iv_raw.len() != IV_LEN {
            return Err(Error::InvalidEnvelope);
        }
        if ct.is_empty() || ct.len() % 16 != 0 {
            return Err(Error::InvalidEnvelope);
        }
        if mac_raw.len() != MAC_LEN {
            return Err(Error::InvalidEnvelope);
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&iv_raw);
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&mac_raw);

        Ok(Self { algo, iv, ct, mac })
    }

    /// Inverse of `parse`; always emits the version prefix.
    pub fn serialize(&self) -> String {
        alloc::format!(
            "{}.{}|{}|{}",
            self.algo.version_tag(),
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ct),
            STANDARD.encode(self.mac),
        )
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algo
    }

    /// Encrypt `plaintext` under `key`, generating a fresh random IV.
    ///
    /// The algorithm tag is chosen from `key.enc_key()`'s length: 32 bytes
    /// selects AES256, 16 bytes selects AES128.
    pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Self, Error> {
        let mut iv = [0u8; IV_LEN];
        getrandom(&mut iv).map_err(|_| Error::InvalidEnvelope)?;

        let ct = match key.enc_key().len() {
            32 => {
                let enc = Aes256CbcEnc::new_from_slices(key.enc_key(), &iv)
                    .map_err(|_| Error::InvalidKeyLength)?;
                enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext)
            }
            16 => {
                let enc = Aes128CbcEnc::new_from_slices(key.enc_key(), &iv)
                    .map_err(|_| Error::InvalidKeyLength)?;
                enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext)
            }
            _ => return Err(Error::InvalidKeyLength),
        };

        let algo = if key.enc_key().len() == 32 {
            Algorithm::Aes256CbcHmacSha256
        } else {
            Algorithm::Aes128CbcHmacSha256
        };

        let mac = compute_mac(key.mac_key(), &iv, &ct)?;

        Ok(Self { algo, iv, ct, mac })
    }

    /// Verify the MAC (constant-time), then decrypt and unpad.
    ///
    /// The MAC is checked before the ciphertext is touched: a wrong key
    /// always fails `MacMismatch`, never `InvalidPadding`.
    pub fn decrypt(&self, key: &SymmetricKey) -> Result<Vec<u8>, Error> {
        let expected_mac = compute_mac(key.mac_key(), &self.iv, &self.ct)?;
        if expected_mac.ct_eq(&self.mac).unwrap_u8() == 0 {
            return Err(Error::MacMismatch);
        }

        match key.enc_key().len() {
            32 => {
                let dec = Aes256CbcDec::new_from_slices(key.enc_key(), &self.iv)
                    .map_err(|_| Error::InvalidKeyLength)?;
                dec.decrypt_padded_vec_mut::<Pkcs7>(&self.ct)
                    .map_err(|_| Error::InvalidPadding)
            }
            16 => {
                let dec = Aes128CbcDec::new_from_slices(key.enc_key(), &self.iv)
                    .map_err(|_| Error::InvalidKeyLength)?;
                dec.decrypt_padded_vec_mut::<Pkcs7>(&self.ct)
                    .map_err(|_| Error::InvalidPadding)
            }
            _ => Err(Error::InvalidKeyLength),
        }
    }
}

fn compute_mac(mac_key: &[u8], iv: &[u8; IV_LEN], ct: &[u8]) -> Result<[u8; MAC_LEN], Error> {
    let mut mac = HmacSha256::new_from_slice(mac_key).map_err(|_| Error::InvalidKeyLength)?;
    mac.update(iv);
    mac.update(ct);
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_version() {
        let s = "2.MDAwMDAwMDAwMDAwMDAwMA==|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=|MjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjI=";
        let env = Envelope::parse(s).unwrap();
        assert_eq!(env.algorithm(), Algorithm::Aes256CbcHmacSha256);
        assert_eq!(env.iv, [b'0'; 16]);
        assert_eq!(env.ct, alloc::vec![b'1'; 32]);
        assert_eq!(env.mac, [b'2'; 32]);
    }

    #[test]
    fn parse_without_version() {
        let s = "MDAwMDAwMDAwMDAwMDAwMA==|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=|MjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjI=";
        let env = Envelope::parse(s).unwrap();
        assert_eq!(env.algorithm(), Algorithm::Aes128CbcHmacSha256);
        assert_eq!(env.iv, [b'0'; 16]);
        assert_eq!(env.ct, alloc::vec![b'1'; 32]);
        assert_eq!(env.mac, [b'2'; 32]);
    }

    #[test]
    fn parse_rejects_bad_version() {
        let s = "4.MDAwMDAwMDAwMDAwMDAwMA==|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=|MjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjI=";
        assert_eq!(Envelope::parse(s).unwrap_err(), Error::InvalidEnvelope);
    }

    #[test]
    fn parse_rejects_missing_part() {
        let s = "2.MDAwMDAwMDAwMDAwMDAwMA==|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=";
        assert_eq!(Envelope::parse(s).unwrap_err(), Error::InvalidEnvelope);
    }

    #[test]
    fn parse_rejects_bad_iv_length() {
        let s = "2.MDAwMDAwMDAwMDAwMDAwMDA=|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=|MjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjI=";
        assert_eq!(Envelope::parse(s).unwrap_err(), Error::InvalidEnvelope);
    }

    #[test]
    fn parse_rejects_bad_mac_length() {
        let s = "2.MDAwMDAwMDAwMDAwMDAwMA==|MTExMTExMTExMTExMTExMTExMTExMTExMTExMTExMTE=|MjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIyMjIy";
        assert_eq!(Envelope::parse(s).unwrap_err(), Error::InvalidEnvelope);
    }

    #[test]
    fn decrypt_known_answer() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        let env = Envelope {
            algo: Algorithm::Aes256CbcHmacSha256,
            iv: [b'0'; 16],
            ct: hex::decode(
                "3b8ce20e3f4601b69aa203ba54873ce0ed772625\
                 83bfd4f831493552a86421a95a158ec153ff8b5091d383ec6255aa99",
            )
            .unwrap(),
            mac: {
                let raw = hex::decode(
                    "738e5f6efb700bd79df4edd2b325d7753003e1bb\
                     123e643f7dc5b78d72fe6acc",
                )
                .unwrap();
                let mut out = [0u8; 32];
                out.copy_from_slice(&raw);
                out
            },
        };
        let plaintext = env.decrypt(&key).unwrap();
        assert_eq!(plaintext, alloc::vec![b'0'; 32]);
    }

    #[test]
    fn round_trip() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        for len in [0usize, 1, 15, 16, 17, 10 * 1024] {
            let plaintext = alloc::vec![b'x'; len];
            let env = Envelope::encrypt(&key, &plaintext).unwrap();
            let decrypted = env.decrypt(&key).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn two_encryptions_differ_but_both_decrypt() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        let plaintext = b"same plaintext";
        let a = Envelope::encrypt(&key, plaintext).unwrap();
        let b = Envelope::encrypt(&key, plaintext).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ct, b.ct);
        assert_ne!(a.mac, b.mac);
        assert_eq!(a.decrypt(&key).unwrap(), plaintext);
        assert_eq!(b.decrypt(&key).unwrap(), plaintext);
    }

    #[test]
    fn wrong_key_fails_mac_not_padding() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        let other = SymmetricKey::construct(&[b'1'; 64]).unwrap();
        let env = Envelope::encrypt(&key, b"hello").unwrap();
        assert_eq!(env.decrypt(&other).unwrap_err(), Error::MacMismatch);
    }

    #[test]
    fn tamper_flips_cause_mac_mismatch() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        let env = Envelope::encrypt(&key, b"hello world").unwrap();

        let mut tampered_iv = env.clone();
        tampered_iv.iv[0] ^= 0x01;
        assert_eq!(tampered_iv.decrypt(&key).unwrap_err(), Error::MacMismatch);

        let mut tampered_ct = env.clone();
        tampered_ct.ct[0] ^= 0x01;
        assert_eq!(tampered_ct.decrypt(&key).unwrap_err(), Error::MacMismatch);

        let mut tampered_mac = env.clone();
        tampered_mac.mac[0] ^= 0x01;
        assert_eq!(tampered_mac.decrypt(&key).unwrap_err(), Error::MacMismatch);
    }

    #[test]
    fn serialize_round_trips_through_parse() {
        let key = SymmetricKey::construct(&[b'0'; 64]).unwrap();
        let env = Envelope::encrypt(&key, b"payload").unwrap();
        let reparsed = Envelope::parse(&env.serialize()).unwrap();
        assert_eq!(reparsed.decrypt(&key).unwrap(), b"payload");
    }
}
