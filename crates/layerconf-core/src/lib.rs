//! layerconf Core
//!
//! Layered configuration and secret resolution.
//! Values are looked up in an ordered list of sources (environment, `KEY=value`
//! files, one-file-per-key directories, mounted secrets), optionally decrypted
//! from Fernet tokens, cast to the requested type, and recorded for
//! introspection.
//!
//! ## Resolving values
//!
//! ```rust
//! use layerconf_core::cast::{Bool, Integer};
//! use layerconf_core::resolver::{Config, Request};
//! use layerconf_core::sources::EnvSource;
//!
//! let config = Config::new()
//!     .source(EnvSource::with_vars([("PORT", "8080"), ("VERBOSE", "yes")]));
//!
//! let port = config.lookup("PORT", Integer::new()).unwrap();
//! let verbose = config.lookup("VERBOSE", Bool).unwrap();
//! let host = config.resolve(&Request::new("HOST").default("localhost"), &layerconf_core::cast::Raw).unwrap();
//!
//! assert_eq!(port, Some(8080));
//! assert_eq!(verbose, Some(true));
//! assert_eq!(host.as_deref(), Some("localhost"));
//! ```
//!
//! ## Secrets
//!
//! Sensitive keys are only read from sources that carry key material, and
//! their values are decrypted before casting:
//!
//! ```rust
//! use layerconf_core::crypto::{FernetKey, KeyRing};
//! use layerconf_core::resolver::Config;
//! use layerconf_core::sources::EnvSource;
//!
//! let ring = KeyRing::new(vec![FernetKey::generate()]).unwrap();
//! let token = ring.encrypt("s3cret");
//!
//! let config = Config::new().source(EnvSource::with_vars([("DB_PASSWORD", token)]).keys(ring));
//! assert_eq!(config.get_secret("DB_PASSWORD", None).unwrap().as_deref(), Some("s3cret"));
//! ```

pub mod logging;
pub mod policy;
pub mod crypto;
pub mod sources;
pub mod cast;
pub mod resolver;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use logging::{Logger, SharedLogger, MemoryLogger, TracingLogger};

pub use policy::{Policy, PolicyError};

pub use crypto::{CryptoError, FernetKey, KeyRing};

pub use sources::{
    ValueSource, Source, SourceError, SourceResult,
    EnvSource, FileSource, DirSource, SecretsDirSource,
    SourceKind, SourceSpec,
};

pub use cast::{Cast, CastError};

pub use resolver::{
    config, Config, ConfigError, ConfigResult,
    Fallback, Request, Resolution, Manifest, DebugGuard,
};
