//! Layered resolver
//!
//! A `Config` walks its sources in order and stops at the first one that
//! holds the key:
//! 1. Sensitive keys skip sources without key material
//! 2. Sensitive values are decrypted; bad tokens are warned about and skipped
//! 3. The value is cast and recorded
//!
//! When no source holds the key the request's `Fallback` decides between a
//! default, `None`, or `ConfigError::Missing`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::cast::{apply, Cast, CastError, Raw};
use crate::logging::{SharedLogger, TracingLogger};
use crate::sources::{
    DirSource, EnvSource, FileSource, SecretsDirSource, Source, SourceError, ValueSource,
};
use super::error::{ConfigError, ConfigResult};
use super::manifest::Manifest;
use super::record::Resolution;
use super::request::{Fallback, Request};

/// Ordered set of sources plus the record of what was resolved
///
/// # Example
///
/// ```
/// use layerconf_core::cast::Integer;
/// use layerconf_core::resolver::{Config, Request};
/// use layerconf_core::sources::EnvSource;
///
/// let config = Config::new().source(EnvSource::with_vars([("PORT", "8080")]));
///
/// let port = config.resolve(&Request::new("PORT"), &Integer::new()).unwrap();
/// assert_eq!(port, Some(8080));
///
/// let host = config.get_or("HOST", "localhost").unwrap();
/// assert_eq!(host, "localhost");
/// assert!(config.resolution("HOST").unwrap().default_used);
/// ```
pub struct Config {
    sources: Vec<Source>,
    debug: AtomicBool,
    records: RwLock<BTreeMap<String, Resolution>>,
    logger: SharedLogger,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("debug", &self.is_debug())
            .field("resolved", &self.records.read().len())
            .finish()
    }
}

impl Config {
    /// A resolver with no sources, logging through `tracing`
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            debug: AtomicBool::new(false),
            records: RwLock::new(BTreeMap::new()),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Build a resolver from a YAML manifest
    pub fn from_manifest(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Manifest::load(path)?.build()
    }

    /// Send resolver warnings to `logger`
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_debug(self, enabled: bool) -> Self {
        self.set_debug(enabled);
        self
    }

    /// Append a source; earlier sources take precedence
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Append the process environment
    pub fn env(self) -> Self {
        self.source(EnvSource::new())
    }

    /// Append a `KEY=value` file
    pub fn file(self, path: impl Into<PathBuf>) -> Self {
        self.source(FileSource::new(path))
    }

    /// Append a one-file-per-key directory
    pub fn dir(self, path: impl Into<PathBuf>) -> Self {
        self.source(DirSource::new(path))
    }

    /// Append a mounted secrets directory
    pub fn secrets_dir(self, path: impl Into<PathBuf>) -> Self {
        self.source(SecretsDirSource::new(path))
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::SeqCst)
    }

    /// In debug mode missing keys resolve to `None` with a warning
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::SeqCst);
    }

    /// Set the debug flag until the returned guard is dropped
    ///
    /// ```
    /// use layerconf_core::resolver::Config;
    ///
    /// let config = Config::new();
    /// {
    ///     let _guard = config.debug_scope(true);
    ///     assert!(config.is_debug());
    /// }
    /// assert!(!config.is_debug());
    /// ```
    pub fn debug_scope(&self, enabled: bool) -> DebugGuard<'_> {
        let previous = self.debug.swap(enabled, Ordering::SeqCst);
        DebugGuard {
            config: self,
            previous,
        }
    }

    /// Resolve `request` and cast the result with `cast`
    ///
    /// Returns `Ok(None)` for a null default, or for an undefined key in
    /// debug mode. Policy violations on a key file abort the search.
    pub fn resolve<C: Cast + ?Sized>(
        &self,
        request: &Request,
        cast: &C,
    ) -> ConfigResult<Option<C::Output>> {
        let key = request.key.as_str();
        let mut checked = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let name = source.name();
            if request.sensitive && !source.is_encrypted() {
                crate::log_debug!(self.logger, "{key}: skipping unencrypted source {name}");
                checked.push(format!("{name} (skipped: not encrypted)"));
                continue;
            }
            checked.push(name.clone());

            let raw = match source.lookup(key) {
                Ok(raw) => raw,
                Err(SourceError::NotFound(_)) => continue,
                Err(SourceError::Policy(err)) => return Err(err.into()),
                Err(err) => {
                    crate::log_debug!(self.logger, "{key}: lookup in {name} failed: {err}");
                    continue;
                }
            };

            let plain = if request.sensitive {
                match source.decrypt(&raw, request.ttl) {
                    Ok(plain) => plain,
                    Err(SourceError::Policy(err)) => return Err(err.into()),
                    Err(SourceError::InvalidToken) => {
                        crate::log_warn!(
                            self.logger,
                            "{key} found in {name} but improperly encrypted or expired"
                        );
                        continue;
                    }
                    Err(err) => {
                        crate::log_warn!(self.logger, "{key} found in {name} but not decrypted: {err}");
                        continue;
                    }
                }
            } else {
                raw.clone()
            };

            let value = self.cast(request, cast, &plain)?;
            self.record(
                key,
                Resolution {
                    raw: Some(raw),
                    value: to_json(&value),
                    source: Some(name),
                    default_used: false,
                    sensitive: request.sensitive,
                    ttl: request.ttl,
                },
            );
            return Ok(Some(value));
        }

        match &request.default {
            Fallback::Value(raw) => {
                self.warn_sensitive_default(request);
                let value = self.cast(request, cast, raw)?;
                self.record(
                    key,
                    Resolution {
                        raw: Some(raw.clone()),
                        value: to_json(&value),
                        source: None,
                        default_used: true,
                        sensitive: request.sensitive,
                        ttl: request.ttl,
                    },
                );
                Ok(Some(value))
            }
            Fallback::Null => {
                self.warn_sensitive_default(request);
                self.record(
                    key,
                    Resolution {
                        raw: None,
                        value: Value::Null,
                        source: None,
                        default_used: true,
                        sensitive: request.sensitive,
                        ttl: request.ttl,
                    },
                );
                Ok(None)
            }
            Fallback::Undefined if self.is_debug() => {
                crate::log_warn!(self.logger, "{key} is not defined; checked: {}", checked.join(", "));
                Ok(None)
            }
            Fallback::Undefined => Err(ConfigError::Missing {
                key: key.to_string(),
                checked,
            }),
        }
    }

    fn cast<C: Cast + ?Sized>(
        &self,
        request: &Request,
        cast: &C,
        raw: &str,
    ) -> Result<C::Output, CastError> {
        apply(cast, &request.key, raw).map_err(|err| {
            if request.sensitive {
                err.redacted()
            } else {
                err
            }
        })
    }

    fn warn_sensitive_default(&self, request: &Request) {
        if request.sensitive && !self.is_debug() {
            crate::log_warn!(
                self.logger,
                "{} is marked sensitive but using a default value",
                request.key
            );
        }
    }

    fn record(&self, key: &str, resolution: Resolution) {
        self.records.write().insert(key.to_string(), resolution);
    }

    /// Raw string value of a required key
    pub fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        self.resolve(&Request::new(key), &Raw)
    }

    /// Raw string value, or `default` when no source holds the key
    pub fn get_or(&self, key: &str, default: impl Into<String>) -> ConfigResult<String> {
        let default = default.into();
        let value = self.resolve(&Request::new(key).default(default.clone()), &Raw)?;
        Ok(value.unwrap_or(default))
    }

    /// Decrypted value of a required sensitive key
    pub fn get_secret(&self, key: &str, ttl: Option<u64>) -> ConfigResult<Option<String>> {
        let mut request = Request::new(key).sensitive();
        request.ttl = ttl;
        self.resolve(&request, &Raw)
    }

    /// Value of a required key cast with `cast`
    pub fn lookup<C: Cast>(&self, key: &str, cast: C) -> ConfigResult<Option<C::Output>> {
        self.resolve(&Request::new(key), &cast)
    }

    /// Encrypt `value` with the keys of the source at `source_index`
    pub fn encrypt(&self, value: &str, source_index: usize) -> ConfigResult<String> {
        let source = self
            .sources
            .get(source_index)
            .ok_or(ConfigError::NoSource {
                index: source_index,
                count: self.sources.len(),
            })?;
        Ok(source.encrypt(value)?)
    }

    /// Every resolved key and its cast value
    pub fn defined(&self) -> BTreeMap<String, Value> {
        self.records
            .read()
            .iter()
            .map(|(key, resolution)| (key.clone(), resolution.value.clone()))
            .collect()
    }

    /// How `key` was last resolved
    pub fn resolution(&self, key: &str) -> Option<Resolution> {
        self.records.read().get(key).cloned()
    }

    pub fn resolutions(&self) -> BTreeMap<String, Resolution> {
        self.records.read().clone()
    }

    pub fn clear_resolutions(&self) {
        self.records.write().clear();
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Restores the debug flag it replaced when dropped
#[must_use = "the previous debug flag is restored when the guard is dropped"]
pub struct DebugGuard<'a> {
    config: &'a Config,
    previous: bool,
}

impl Drop for DebugGuard<'_> {
    fn drop(&mut self) {
        self.config.set_debug(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use tempfile::TempDir;

    use crate::cast::{Bool, FnCast, Integer};
    use crate::crypto::{FernetKey, KeyRing};
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::policy::Policy;

    fn ring() -> KeyRing {
        KeyRing::new(vec![FernetKey::generate()]).unwrap()
    }

    fn with_memory_logger(config: Config) -> (Config, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        (config.with_logger(logger.clone()), logger)
    }

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Config>();
    }

    #[test]
    fn test_first_match_wins() {
        let config = Config::new()
            .source(EnvSource::with_vars([("PORT", "1")]))
            .source(EnvSource::with_vars([("PORT", "2"), ("HOST", "example.org")]));

        assert_eq!(config.get("PORT").unwrap().as_deref(), Some("1"));
        assert_eq!(config.get("HOST").unwrap().as_deref(), Some("example.org"));
        assert_eq!(config.resolution("PORT").unwrap().source.as_deref(), Some("env:mapping"));
    }

    #[test]
    fn test_end_to_end_env_over_file_with_default() {
        let dir = TempDir::new().unwrap();
        let defaults = dir.path().join("defaults.conf");
        fs::write(&defaults, "PORT=80\n").unwrap();

        let config = Config::new()
            .source(EnvSource::with_vars([("PORT", "8080")]))
            .file(&defaults);

        let port = config.resolve(&Request::new("PORT"), &Integer::new()).unwrap();
        assert_eq!(port, Some(8080));

        let host = config
            .resolve(&Request::new("HOST").default("localhost"), &Raw)
            .unwrap();
        assert_eq!(host.as_deref(), Some("localhost"));

        let record = config.resolution("HOST").unwrap();
        assert!(record.default_used);
        assert!(record.source.is_none());
        assert!(!config.resolution("PORT").unwrap().default_used);
    }

    #[test]
    fn test_missing_key_errors_and_lists_sources() {
        let dir = TempDir::new().unwrap();
        let config = Config::new()
            .source(EnvSource::with_vars([("A", "1")]))
            .dir(dir.path());

        match config.get("NOPE") {
            Err(ConfigError::Missing { key, checked }) => {
                assert_eq!(key, "NOPE");
                assert_eq!(checked.len(), 2);
                assert_eq!(checked[0], "env:mapping");
                assert!(checked[1].starts_with("dir:"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
        assert!(config.resolution("NOPE").is_none());
    }

    #[test]
    fn test_missing_key_in_debug_mode_warns() {
        let (config, logger) =
            with_memory_logger(Config::new().source(EnvSource::with_vars([("A", "1")])));
        config.set_debug(true);

        assert_eq!(config.get("NOPE").unwrap(), None);
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("NOPE"));
        assert!(warnings[0].contains("env:mapping"));
    }

    #[test]
    fn test_null_default_skips_cast() {
        let never = FnCast::new("never", |_: &str| -> Result<i64, String> {
            Err("cast should not run".to_string())
        });
        let config = Config::new().source(EnvSource::with_vars([("A", "1")]));

        let value = config.resolve(&Request::new("OPTIONAL").null_default(), &never).unwrap();
        assert_eq!(value, None);

        let record = config.resolution("OPTIONAL").unwrap();
        assert!(record.default_used);
        assert_eq!(record.value, Value::Null);
        assert!(record.raw.is_none());
    }

    #[test]
    fn test_default_is_cast() {
        let config = Config::new();
        let value = config
            .resolve(&Request::new("WORKERS").default("4"), &Integer::new())
            .unwrap();
        assert_eq!(value, Some(4));
        assert_eq!(config.defined()["WORKERS"], 4);

        let err = config
            .resolve(&Request::new("WORKERS").default("four"), &Integer::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Cast(_)));
    }

    #[test]
    fn test_cast_errors_propagate() {
        let config = Config::new().source(EnvSource::with_vars([("FEATURE_X", "maybe")]));
        match config.lookup("FEATURE_X", Bool) {
            Err(ConfigError::Cast(err)) => {
                assert_eq!(err.key, "FEATURE_X");
                assert_eq!(err.value, "maybe");
            }
            other => panic!("expected Cast error, got {other:?}"),
        }
    }

    #[test]
    fn test_sensitive_skips_unencrypted_sources() {
        let (config, logger) = with_memory_logger(
            Config::new().source(EnvSource::with_vars([("API_TOKEN", "plaintext")])),
        );

        let value = config
            .resolve(&Request::new("API_TOKEN").sensitive().default("dev-token"), &Raw)
            .unwrap();
        assert_eq!(value.as_deref(), Some("dev-token"));
        assert!(config.resolution("API_TOKEN").unwrap().default_used);
        assert_eq!(logger.warnings().len(), 1);
        assert!(logger.warnings()[0].contains("marked sensitive but using a default value"));

        match config.get_secret("API_TOKEN", None) {
            Err(ConfigError::Missing { checked, .. }) => {
                assert_eq!(checked.len(), 1);
                assert!(checked[0].contains("skipped"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn test_sensitive_default_is_quiet_in_debug_mode() {
        let (config, logger) = with_memory_logger(Config::new());
        let _guard = config.debug_scope(true);

        let value = config
            .resolve(&Request::new("API_TOKEN").sensitive().default("dev-token"), &Raw)
            .unwrap();
        assert_eq!(value.as_deref(), Some("dev-token"));
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_sensitive_value_is_decrypted() {
        let ring = ring();
        let token = ring.encrypt("s3cret");
        let config = Config::new().source(EnvSource::with_vars([("DB_PASSWORD", token.clone())]).keys(ring));

        assert_eq!(config.get_secret("DB_PASSWORD", None).unwrap().as_deref(), Some("s3cret"));

        let record = config.resolution("DB_PASSWORD").unwrap();
        assert!(record.sensitive);
        assert_eq!(record.raw.as_deref(), Some(token.as_str()));
        assert_eq!(record.display_value(), "********");
    }

    #[test]
    fn test_improperly_encrypted_value_falls_through() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("DB_PASSWORD"), "from-secrets\n").unwrap();

        let (config, logger) = with_memory_logger(
            Config::new()
                .source(EnvSource::with_vars([("DB_PASSWORD", "not-a-token")]).keys(ring()))
                .secrets_dir(dir.path()),
        );

        assert_eq!(
            config.get_secret("DB_PASSWORD", None).unwrap().as_deref(),
            Some("from-secrets")
        );
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("improperly encrypted or expired"));
        assert!(config.resolution("DB_PASSWORD").unwrap().source.unwrap().starts_with("secrets:"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let ring = ring();
        let token = ring.encrypt_at("old", now() - 3600);
        let (config, logger) = with_memory_logger(
            Config::new().source(EnvSource::with_vars([("TOKEN", token)]).keys(ring)),
        );

        assert!(matches!(
            config.get_secret("TOKEN", Some(60)),
            Err(ConfigError::Missing { .. })
        ));
        assert!(logger.warnings()[0].contains("improperly encrypted or expired"));

        assert_eq!(config.get_secret("TOKEN", Some(7200)).unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_missing_key_file_warns_and_continues() {
        let dir = TempDir::new().unwrap();
        let (config, logger) = with_memory_logger(
            Config::new()
                .source(
                    EnvSource::with_vars([("TOKEN", "gAAAA")])
                        .key_file(dir.path().join("absent.key"), Policy::OwnerOnly),
                )
                .source(EnvSource::with_vars([("TOKEN", "x")])),
        );
        config.set_debug(true);

        assert_eq!(config.get_secret("TOKEN", None).unwrap(), None);
        let warnings = logger.warnings();
        assert!(warnings[0].contains("not decrypted"));
        assert!(warnings[1].contains("skipped"));
    }

    #[cfg(unix)]
    #[test]
    fn test_group_writable_key_file_is_fatal() {
        use std::os::unix::fs::PermissionsExt;
        use crate::test_support::write_key_file;

        let dir = TempDir::new().unwrap();
        let key = FernetKey::generate();
        let key_path = dir.path().join("app.key");
        write_key_file(&key_path, &[key.clone()]);
        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o660)).unwrap();

        let env_path = dir.path().join("app.env");
        let token = KeyRing::new(vec![key]).unwrap().encrypt("s3cret");
        fs::write(&env_path, format!("TOKEN={token}\n")).unwrap();

        let fallback = TempDir::new().unwrap();
        fs::write(fallback.path().join("TOKEN"), "from-secrets").unwrap();

        let config = Config::new()
            .source(FileSource::new(&env_path).key_file(&key_path, Policy::OwnerOnly))
            .secrets_dir(fallback.path());

        assert!(matches!(
            config.get_secret("TOKEN", None),
            Err(ConfigError::Policy(_))
        ));
        assert!(config.resolution("TOKEN").is_none());

        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600)).unwrap();
        assert_eq!(config.get_secret("TOKEN", None).unwrap().as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_sensitive_cast_errors_are_redacted() {
        let ring = ring();
        let token = ring.encrypt("1234x");
        let config = Config::new().source(EnvSource::with_vars([("PIN", token)]).keys(ring));

        let err = config
            .resolve(&Request::new("PIN").sensitive(), &Integer::new())
            .unwrap_err();
        assert!(!err.to_string().contains("1234x"));
    }

    #[test]
    fn test_debug_scope_restores_nested_state() {
        let config = Config::new();
        {
            let _outer = config.debug_scope(true);
            assert!(config.is_debug());
            {
                let _inner = config.debug_scope(false);
                assert!(!config.is_debug());
            }
            assert!(config.is_debug());
        }
        assert!(!config.is_debug());
    }

    #[test]
    fn test_no_result_caching() {
        let dir = TempDir::new().unwrap();
        let config = Config::new().dir(dir.path());

        fs::write(dir.path().join("MODE"), "a").unwrap();
        assert_eq!(config.get("MODE").unwrap().as_deref(), Some("a"));
        fs::write(dir.path().join("MODE"), "b").unwrap();
        assert_eq!(config.get("MODE").unwrap().as_deref(), Some("b"));
        assert_eq!(config.resolution("MODE").unwrap().value, "b");
    }

    #[test]
    fn test_defined_and_resolutions() {
        let config = Config::new().source(EnvSource::with_vars([("PORT", "8080"), ("DEBUG", "yes")]));
        config.lookup("PORT", Integer::new()).unwrap();
        config.lookup("DEBUG", Bool).unwrap();
        config.get_or("HOST", "localhost").unwrap();

        let defined = config.defined();
        assert_eq!(defined.len(), 3);
        assert_eq!(defined["PORT"], 8080);
        assert_eq!(defined["DEBUG"], true);
        assert_eq!(defined["HOST"], "localhost");
        assert_eq!(config.resolutions().len(), 3);

        config.clear_resolutions();
        assert!(config.defined().is_empty());
    }

    #[test]
    fn test_encrypt_through_source() {
        let ring = ring();
        let config = Config::new()
            .source(EnvSource::with_vars([("A", "1")]))
            .source(EnvSource::with_vars([("A", "1")]).keys(ring.clone()));

        let token = config.encrypt("hello", 1).unwrap();
        assert_eq!(ring.decrypt(&token, None).unwrap(), "hello");

        assert!(matches!(
            config.encrypt("hello", 0),
            Err(ConfigError::Source(SourceError::NoKeys(_)))
        ));
        assert!(matches!(
            config.encrypt("hello", 5),
            Err(ConfigError::NoSource { index: 5, count: 2 })
        ));
    }

    #[test]
    fn test_rotated_key_file_reads_old_tokens() {
        use crate::test_support::write_key_file;

        let dir = TempDir::new().unwrap();
        let old = FernetKey::generate();
        let new = FernetKey::generate();
        let old_ring = KeyRing::new(vec![old.clone()]).unwrap();
        let new_ring = KeyRing::new(vec![new.clone()]).unwrap();

        let key_path = dir.path().join("app.key");
        write_key_file(&key_path, &[new, old]);
        let env_path = dir.path().join("app.env");
        fs::write(&env_path, format!("TOKEN={}\n", old_ring.encrypt("before"))).unwrap();

        let config = Config::new().source(FileSource::new(&env_path).key_file(&key_path, Policy::OwnerOnly));
        assert_eq!(config.get_secret("TOKEN", None).unwrap().as_deref(), Some("before"));

        let token = config.encrypt("after", 0).unwrap();
        assert_eq!(new_ring.decrypt(&token, None).unwrap(), "after");
        assert!(old_ring.decrypt(&token, None).is_err());
    }

    #[test]
    fn test_skipped_sources_logged_at_debug() {
        let (config, logger) = with_memory_logger(
            Config::new()
                .source(EnvSource::with_vars([("TOKEN", "plain")]))
                .source(EnvSource::with_vars([("TOKEN", "also-plain")]).keys(ring())),
        );

        assert!(config.get_secret("TOKEN", None).is_err());
        let skipped: Vec<String> = logger
            .entries()
            .into_iter()
            .filter(|(level, _)| *level == LogLevel::Debug)
            .map(|(_, message)| message)
            .collect();
        assert_eq!(skipped, vec!["TOKEN: skipping unencrypted source env:mapping".to_string()]);
    }
}
