//! `KEY=value` file source

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use super::keys::{key_builders, KeyMaterial};
use super::traits::{SourceError, SourceResult, ValueSource};

/// Source backed by a single file of `KEY=value` lines
///
/// The file is parsed after the first successful open and the result kept
/// for the life of the source; later edits to the file are not seen. While
/// the file is missing or unreadable every lookup is `NotFound` and the open
/// is retried, so optional config files can be listed before they exist.
///
/// # Format
///
/// ```text
/// # comments and lines without '=' are ignored
/// PORT=8080
/// export HOST=example.com
/// GREETING="hello world"
/// ```
pub struct FileSource {
    path: PathBuf,
    keys: Option<KeyMaterial>,
    values: OnceCell<HashMap<String, String>>,
}

impl FileSource {
    /// Create a source for `path`; nothing is read until the first lookup
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: None,
            values: OnceCell::new(),
        }
    }

    key_builders!();

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the backing file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn values(&self) -> Option<&HashMap<String, String>> {
        let loaded = self
            .values
            .get_or_try_init(|| fs::read_to_string(&self.path).map(|contents| parse_env_file(&contents)));
        match loaded {
            Ok(values) => Some(values),
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "config file not readable");
                None
            }
        }
    }
}

/// Parse `KEY=value` lines
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
        if key.is_empty() {
            continue;
        }
        values.insert(key.to_string(), strip_quotes(value.trim()).to_string());
    }
    values
}

/// Strip one pair of matching quotes; the first character decides the quote type
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

impl ValueSource for FileSource {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn lookup(&self, key: &str) -> SourceResult<String> {
        self.values()
            .and_then(|values| values.get(key))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(key.to_string()))
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

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .field("encrypted", &self.keys.is_some())
            .field("loaded", &self.values.get().is_some())
            .finish()
    }
}
