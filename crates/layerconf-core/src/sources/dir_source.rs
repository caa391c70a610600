//! Directory-of-files sources

use std::fs;
use std::path::{Path, PathBuf};

use super::keys::{key_builders, KeyMaterial};
use super::traits::{SourceError, SourceResult, ValueSource};

/// Source backed by a directory where each key is a file
///
/// The value is the file's contents with surrounding whitespace trimmed.
/// Every lookup reads the one file again; nothing is cached.
pub struct DirSource {
    path: PathBuf,
    keys: Option<KeyMaterial>,
}

impl DirSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: None,
        }
    }

    key_builders!();

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, key: &str) -> SourceResult<String> {
        if !is_plain_file_name(key) {
            return Err(SourceError::NotFound(key.to_string()));
        }
        let file = self.path.join(key);
        match fs::read_to_string(&file) {
            Ok(contents) => Ok(contents.trim().to_string()),
            Err(err) => {
                tracing::trace!(path = %file.display(), error = %err, "no file for key");
                Err(SourceError::NotFound(key.to_string()))
            }
        }
    }
}

/// Keys must name a file directly inside the directory
fn is_plain_file_name(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains('/')
        && !key.contains('\\')
        && !key.contains('\0')
}

impl ValueSource for DirSource {
    fn name(&self) -> String {
        format!("dir:{}", self.path.display())
    }

    fn lookup(&self, key: &str) -> SourceResult<String> {
        self.read(key)
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

impl std::fmt::Debug for DirSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirSource")
            .field("path", &self.path)
            .field("encrypted", &self.keys.is_some())
            .finish()
    }
}

/// Directory source for mounted secret volumes
///
/// Always accepted for sensitive keys. Values are stored in plain text and
/// encrypt/decrypt are the identity; confidentiality comes from the mount
/// (Kubernetes or Docker secrets), so `ttl` is ignored.
#[derive(Debug)]
pub struct SecretsDirSource {
    inner: DirSource,
}

impl SecretsDirSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: DirSource::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }
}

impl ValueSource for SecretsDirSource {
    fn name(&self) -> String {
        format!("secrets:{}", self.inner.path.display())
    }

    fn lookup(&self, key: &str) -> SourceResult<String> {
        self.inner.read(key)
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn encrypt(&self, plaintext: &str) -> SourceResult<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, token: &str, _ttl: Option<u64>) -> SourceResult<String> {
        Ok(token.to_string())
    }
}
