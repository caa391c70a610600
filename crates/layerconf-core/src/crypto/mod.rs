//! Symmetric authenticated encryption for stored values
//!
//! - `FernetKey`: a single key, token encrypt/decrypt with TTL checks
//! - `KeyRing`: ordered keys supporting rotation

mod fernet;
mod keyring;

pub use fernet::FernetKey;
pub use keyring::KeyRing;

use thiserror::Error;

/// Errors from key parsing and token decryption
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Bad encoding, failed signature, or an expired/future timestamp
    #[error("Invalid or expired token")]
    InvalidToken,
}
