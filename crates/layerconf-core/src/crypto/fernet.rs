//! Fernet tokens (AES-128-CBC + HMAC-SHA256)
//!
//! Token layout, url-safe base64 encoded:
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | iv (16) | ciphertext (PKCS7) | hmac-sha256 (32)
//! ```
//!
//! Tokens interoperate with other Fernet implementations.

use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::CryptoError;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

const VERSION: u8 = 0x80;
const HEADER_LEN: usize = 1 + 8 + 16;
const MAC_LEN: usize = 32;
/// Tokens stamped further than this in the future are rejected
const MAX_CLOCK_SKEW: u64 = 60;

/// A single Fernet key: 16 bytes signing key followed by 16 bytes encryption key
#[derive(Clone, PartialEq, Eq)]
pub struct FernetKey {
    signing: [u8; 16],
    encryption: [u8; 16],
}

impl FernetKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut signing = [0u8; 16];
        let mut encryption = [0u8; 16];
        signing.copy_from_slice(&bytes[..16]);
        encryption.copy_from_slice(&bytes[16..]);
        Self {
            signing,
            encryption,
        }
    }

    /// Parse the url-safe base64 text form; trailing padding is optional
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let decoded = decode(text.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("not url-safe base64: {e}")))?;
        let bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("expected 32 bytes, found {}", decoded.len()))
        })?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Url-safe base64 text form, with padding
    pub fn to_base64(&self) -> String {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&self.signing);
        bytes[16..].copy_from_slice(&self.encryption);
        URL_SAFE.encode(bytes)
    }

    /// Encrypt with the current system time as the token timestamp
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        self.encrypt_at(plaintext, now())
    }

    /// Encrypt with an explicit token timestamp (seconds since the epoch)
    pub fn encrypt_at(&self, plaintext: &[u8], timestamp: u64) -> String {
        let mut iv = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, timestamp, iv)
    }

    fn encrypt_with_iv(&self, plaintext: &[u8], timestamp: u64, iv: [u8; 16]) -> String {
        let ciphertext = Aes128CbcEnc::new(&self.encryption.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + MAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);

        let tag = self.mac(&token).finalize().into_bytes();
        token.extend_from_slice(&tag);
        URL_SAFE.encode(token)
    }

    /// Decrypt against the current system time
    pub fn decrypt(&self, token: &str, ttl: Option<u64>) -> Result<Vec<u8>, CryptoError> {
        self.decrypt_at(token, ttl, now())
    }

    /// Decrypt, treating `now` as the current time for TTL checks
    pub fn decrypt_at(
        &self,
        token: &str,
        ttl: Option<u64>,
        now: u64,
    ) -> Result<Vec<u8>, CryptoError> {
        let data = decode(token.trim()).map_err(|_| CryptoError::InvalidToken)?;
        if data.len() < HEADER_LEN + MAC_LEN || data[0] != VERSION {
            return Err(CryptoError::InvalidToken);
        }

        let mut stamp = [0u8; 8];
        stamp.copy_from_slice(&data[1..9]);
        let timestamp = u64::from_be_bytes(stamp);
        if let Some(ttl) = ttl {
            if timestamp.saturating_add(ttl) < now {
                return Err(CryptoError::InvalidToken);
            }
        }
        if timestamp > now.saturating_add(MAX_CLOCK_SKEW) {
            return Err(CryptoError::InvalidToken);
        }

        let (signed, tag) = data.split_at(data.len() - MAC_LEN);
        self.mac(signed)
            .verify_slice(tag)
            .map_err(|_| CryptoError::InvalidToken)?;

        let iv = &signed[9..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];
        Aes128CbcDec::new_from_slices(&self.encryption, iv)
            .map_err(|_| CryptoError::InvalidToken)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::InvalidToken)
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.signing)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac
    }
}

impl std::fmt::Debug for FernetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FernetKey(********)")
    }
}

fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(text.trim_end_matches('='))
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
