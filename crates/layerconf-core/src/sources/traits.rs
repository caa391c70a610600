//! Core trait and error type for configuration sources

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::policy::PolicyError;

/// Errors that can occur while reading from a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The key is absent from this source; the resolver moves on
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Encryption was requested but the source has no usable keys
    #[error("No keys found for {0}")]
    NoKeys(String),

    #[error("Invalid key material for {source_name}: {reason}")]
    InvalidKey { source_name: String, reason: String },

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

impl From<CryptoError> for SourceError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidToken => SourceError::InvalidToken,
            CryptoError::InvalidKey(reason) => SourceError::InvalidKey {
                source_name: "inline keys".to_string(),
                reason,
            },
        }
    }
}

/// A place configuration values may come from
///
/// Implementations:
/// - `EnvSource`: process environment or an explicit mapping
/// - `FileSource`: one file of `KEY=value` lines
/// - `DirSource`: one file per key
/// - `SecretsDirSource`: one file per key, transport-level confidentiality
///
/// A source only produces raw strings; decryption and casting are the
/// resolver's job.
pub trait ValueSource: Send + Sync {
    /// Human-readable description used in diagnostics
    fn name(&self) -> String;

    /// Raw value for `key`, or `SourceError::NotFound`
    fn lookup(&self, key: &str) -> SourceResult<String>;

    /// Whether this source was constructed with decryption material
    fn is_encrypted(&self) -> bool {
        false
    }

    /// Encrypt a value so it can be stored in this source
    fn encrypt(&self, _plaintext: &str) -> SourceResult<String> {
        Err(SourceError::NoKeys(self.name()))
    }

    /// Decrypt a raw value; `ttl` bounds the token age in seconds
    fn decrypt(&self, _token: &str, _ttl: Option<u64>) -> SourceResult<String> {
        Err(SourceError::NoKeys(self.name()))
    }

    /// Check if the source holds `key`
    fn has(&self, key: &str) -> bool {
        self.lookup(key).is_ok()
    }
}
