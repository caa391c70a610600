//! Lazily loaded key material for encryption-capable sources

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::crypto::{CryptoError, KeyRing};
use crate::policy::Policy;
use super::traits::{SourceError, SourceResult};

#[derive(Debug)]
enum KeySpec {
    Inline(KeyRing),
    File { path: PathBuf, policy: Policy },
}

/// Keys a source uses to encrypt and decrypt values
///
/// A key file is read on first use, after its `Policy` check passes, and the
/// parsed ring is kept for the life of the source. Failed loads are retried
/// on the next call.
#[derive(Debug)]
pub struct KeyMaterial {
    spec: KeySpec,
    ring: OnceCell<KeyRing>,
}

impl KeyMaterial {
    /// Keys supplied directly
    pub fn inline(ring: KeyRing) -> Self {
        Self {
            spec: KeySpec::Inline(ring),
            ring: OnceCell::new(),
        }
    }

    /// Keys read from `path`, one per line, guarded by `policy`
    pub fn file(path: impl Into<PathBuf>, policy: Policy) -> Self {
        Self {
            spec: KeySpec::File {
                path: path.into(),
                policy,
            },
            ring: OnceCell::new(),
        }
    }

    /// Path of the key file, if keys come from one
    pub fn key_file(&self) -> Option<&Path> {
        match &self.spec {
            KeySpec::Inline(_) => None,
            KeySpec::File { path, .. } => Some(path),
        }
    }

    /// The loaded key ring; `source_name` labels errors
    pub fn ring(&self, source_name: &str) -> SourceResult<&KeyRing> {
        match &self.spec {
            KeySpec::Inline(ring) => Ok(ring),
            KeySpec::File { path, policy } => self
                .ring
                .get_or_try_init(|| load_key_file(path, *policy, source_name)),
        }
    }

    pub fn encrypt(&self, source_name: &str, plaintext: &str) -> SourceResult<String> {
        Ok(self.ring(source_name)?.encrypt(plaintext))
    }

    pub fn decrypt(&self, source_name: &str, token: &str, ttl: Option<u64>) -> SourceResult<String> {
        Ok(self.ring(source_name)?.decrypt(token, ttl)?)
    }

    /// Encrypt with `keys`; a source without keys reports `NoKeys`
    pub(crate) fn encrypt_opt(keys: Option<&Self>, source_name: &str, plaintext: &str) -> SourceResult<String> {
        keys.ok_or_else(|| SourceError::NoKeys(source_name.to_string()))?
            .encrypt(source_name, plaintext)
    }

    pub(crate) fn decrypt_opt(
        keys: Option<&Self>,
        source_name: &str,
        token: &str,
        ttl: Option<u64>,
    ) -> SourceResult<String> {
        keys.ok_or_else(|| SourceError::NoKeys(source_name.to_string()))?
            .decrypt(source_name, token, ttl)
    }
}

/// `keys` and `key_file` builders for sources with a `keys: Option<KeyMaterial>` field
macro_rules! key_builders {
    () => {
        /// Make the source encryption-capable with the given keys
        pub fn keys(mut self, ring: $crate::crypto::KeyRing) -> Self {
            self.keys = Some($crate::sources::KeyMaterial::inline(ring));
            self
        }

        /// Make the source encryption-capable with keys read from a key file
        pub fn key_file(
            mut self,
            path: impl Into<std::path::PathBuf>,
            policy: $crate::policy::Policy,
        ) -> Self {
            self.keys = Some($crate::sources::KeyMaterial::file(path, policy));
            self
        }
    };
}

pub(crate) use key_builders;

fn load_key_file(path: &Path, policy: Policy, source_name: &str) -> SourceResult<KeyRing> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), source = source_name, "key file not found");
        return Err(SourceError::NoKeys(source_name.to_string()));
    }

    policy.check(path)?;

    let contents = fs::read_to_string(path)?;
    let has_keys = contents
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#'));
    if !has_keys {
        return Err(SourceError::NoKeys(source_name.to_string()));
    }

    let ring = KeyRing::parse(&contents).map_err(|err| match err {
        CryptoError::InvalidKey(reason) => SourceError::InvalidKey {
            source_name: source_name.to_string(),
            reason: format!("{}: {}", path.display(), reason),
        },
        CryptoError::InvalidToken => SourceError::InvalidToken,
    })?;

    tracing::debug!(
        path = %path.display(),
        source = source_name,
        keys = ring.keys().len(),
        "loaded key file"
    );
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FernetKey;
    use crate::test_support::write_key_file;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_file_is_no_keys() {
        let dir = tempdir().unwrap();
        let keys = KeyMaterial::file(dir.path().join("absent.key"), Policy::OwnerOnly);
        assert!(matches!(keys.encrypt("test", "v"), Err(SourceError::NoKeys(_))));
    }

    #[test]
    fn test_empty_key_file_is_no_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.key");
        write_key_file(&path, &[]);
        let keys = KeyMaterial::file(&path, Policy::OwnerOnly);
        assert!(matches!(keys.ring("test"), Err(SourceError::NoKeys(_))));
    }

    #[test]
    fn test_key_file_loaded_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.key");
        let key = FernetKey::generate();
        write_key_file(&path, &[key.clone()]);

        let keys = KeyMaterial::file(&path, Policy::OwnerOnly);
        let token = keys.encrypt("test", "value").unwrap();

        // Memoized: removing the file does not affect the loaded ring.
        fs::remove_file(&path).unwrap();
        assert_eq!(keys.decrypt("test", &token, None).unwrap(), "value");
        assert_eq!(keys.ring("test").unwrap().primary(), &key);
    }

    #[cfg(unix)]
    #[test]
    fn test_policy_violation_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("exposed.key");
        write_key_file(&path, &[FernetKey::generate()]);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

        let keys = KeyMaterial::file(&path, Policy::OwnerOnly);
        assert!(matches!(keys.ring("test"), Err(SourceError::Policy(_))));
    }

    #[test]
    fn test_inline_keys() {
        let ring = KeyRing::new(vec![FernetKey::generate()]).unwrap();
        let keys = KeyMaterial::inline(ring);
        assert!(keys.key_file().is_none());
        let token = keys.encrypt("test", "abc").unwrap();
        assert_eq!(keys.decrypt("test", &token, None).unwrap(), "abc");
        assert!(matches!(keys.decrypt("test", "bogus", None), Err(SourceError::InvalidToken)));
    }

    #[test]
    fn test_absent_keys_report_source_name() {
        match KeyMaterial::encrypt_opt(None, "env:mapping", "v") {
            Err(SourceError::NoKeys(name)) => assert_eq!(name, "env:mapping"),
            other => panic!("expected NoKeys, got {:?}", other),
        }
        assert!(matches!(
            KeyMaterial::decrypt_opt(None, "dir:/run/config", "token", None),
            Err(SourceError::NoKeys(_))
        ));

        let ring = KeyRing::new(vec![FernetKey::generate()]).unwrap();
        let keys = KeyMaterial::inline(ring);
        let token = KeyMaterial::encrypt_opt(Some(&keys), "test", "abc").unwrap();
        assert_eq!(KeyMaterial::decrypt_opt(Some(&keys), "test", &token, None).unwrap(), "abc");
    }
}
