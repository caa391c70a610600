//! Environment variable source

use std::collections::HashMap;
use std::env;

use super::keys::{key_builders, KeyMaterial};
use super::traits::{SourceError, SourceResult, ValueSource};

/// Source backed by the process environment, or by an explicit mapping
///
/// With `with_vars` the mapping is used instead of the process environment,
/// which keeps tests and embedded callers independent of global state.
/// Empty values count as present.
///
/// # Example
///
/// ```
/// use layerconf_core::sources::{EnvSource, ValueSource};
///
/// let source = EnvSource::with_vars([("PORT", "8080")]);
/// assert_eq!(source.lookup("PORT").unwrap(), "8080");
/// assert!(source.lookup("HOST").is_err());
/// ```
#[derive(Debug, Default)]
pub struct EnvSource {
    vars: Option<HashMap<String, String>>,
    keys: Option<KeyMaterial>,
}

impl EnvSource {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from an explicit mapping instead of the process environment
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            keys: None,
        }
    }

    key_builders!();
}

impl ValueSource for EnvSource {
    fn name(&self) -> String {
        match &self.vars {
            Some(_) => "env:mapping".to_string(),
            None => "env".to_string(),
        }
    }

    fn lookup(&self, key: &str) -> SourceResult<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(key).cloned(),
            None => env::var(key).ok(),
        };
        value.ok_or_else(|| SourceError::NotFound(key.to_string()))
    }

    fn is_encrypted(&self) -> bool {
        self.keys.is_some()
    }

    fn encrypt(&self, plaintext: &str) -> SourceResult<String> {
        KeyMaterial::encrypt_opt(self.keys.as_ref(), &self.name(), plaintext)
    }

    fn decrypt(&self, token: &str, ttl: Option<u64>) -> SourceResult<String> {
        KeyMaterial::decrypt_opt(self.keys.as_ref(), &self.name(), token, ttl)
    }
}
