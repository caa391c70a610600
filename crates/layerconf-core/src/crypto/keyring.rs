//! Ordered key sets for rotation

use super::{CryptoError, FernetKey};

/// One or more Fernet keys
///
/// The first key encrypts; decryption tries every key in order, so a new
/// key can be prepended while tokens made with older keys still decrypt.
///
/// # Example
///
/// ```
/// use layerconf_core::crypto::{FernetKey, KeyRing};
///
/// let old = FernetKey::generate();
/// let token = KeyRing::new(vec![old.clone()]).unwrap().encrypt("secret");
///
/// let rotated = KeyRing::new(vec![FernetKey::generate(), old]).unwrap();
/// assert_eq!(rotated.decrypt(&token, None).unwrap(), "secret");
/// ```
#[derive(Debug, Clone)]
pub struct KeyRing {
    keys: Vec<FernetKey>,
}

impl KeyRing {
    /// Build a ring; an empty key list is rejected
    pub fn new(keys: Vec<FernetKey>) -> Result<Self, CryptoError> {
        if keys.is_empty() {
            return Err(CryptoError::InvalidKey("no keys supplied".to_string()));
        }
        Ok(Self { keys })
    }

    /// Parse key-file contents: one key per line, blank lines and `#` comments ignored
    pub fn parse(contents: &str) -> Result<Self, CryptoError> {
        let keys = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(FernetKey::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }

    /// The active (encryption) key
    pub fn primary(&self) -> &FernetKey {
        &self.keys[0]
    }

    pub fn keys(&self) -> &[FernetKey] {
        &self.keys
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        self.primary().encrypt(plaintext.as_bytes())
    }

    pub fn encrypt_at(&self, plaintext: &str, timestamp: u64) -> String {
        self.primary().encrypt_at(plaintext.as_bytes(), timestamp)
    }

    pub fn decrypt(&self, token: &str, ttl: Option<u64>) -> Result<String, CryptoError> {
        self.try_each(|key| key.decrypt(token, ttl))
    }

    pub fn decrypt_at(&self, token: &str, ttl: Option<u64>, now: u64) -> Result<String, CryptoError> {
        self.try_each(|key| key.decrypt_at(token, ttl, now))
    }

    fn try_each<F>(&self, attempt: F) -> Result<String, CryptoError>
    where
        F: Fn(&FernetKey) -> Result<Vec<u8>, CryptoError>,
    {
        for key in &self.keys {
            if let Ok(bytes) = attempt(key) {
                return String::from_utf8(bytes).map_err(|_| CryptoError::InvalidToken);
            }
        }
        Err(CryptoError::InvalidToken)
    }
}
