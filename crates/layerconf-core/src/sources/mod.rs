//! Configuration sources
//!
//! This module provides the places values are read from:
//! - `ValueSource` trait shared by every source
//! - Built-in sources: `EnvSource`, `FileSource`, `DirSource`, `SecretsDirSource`
//! - `Source`, the closed set the resolver stores
//! - `SourceSpec` for describing sources in manifests and on the command line

mod traits;
mod keys;
mod env_source;
mod file_source;
mod dir_source;
mod spec;

pub use traits::{ValueSource, SourceError, SourceResult};
pub use keys::KeyMaterial;
pub use env_source::EnvSource;
pub use file_source::{FileSource, parse_env_file};
pub use dir_source::{DirSource, SecretsDirSource};
pub use spec::{SourceKind, SourceSpec, SpecError};

/// Any of the built-in sources
///
/// The resolver keeps its sources as this enum so every variant is handled
/// by exhaustive matching.
#[derive(Debug)]
pub enum Source {
    Env(EnvSource),
    File(FileSource),
    Dir(DirSource),
    SecretsDir(SecretsDirSource),
}

macro_rules! dispatch {
    ($self:ident, $source:ident => $call:expr) => {
        match $self {
            Source::Env($source) => $call,
            Source::File($source) => $call,
            Source::Dir($source) => $call,
            Source::SecretsDir($source) => $call,
        }
    };
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Env(_) => SourceKind::Env,
            Source::File(_) => SourceKind::File,
            Source::Dir(_) => SourceKind::Dir,
            Source::SecretsDir(_) => SourceKind::Secrets,
        }
    }
}

impl ValueSource for Source {
    fn name(&self) -> String {
        dispatch!(self, source => source.name())
    }

    fn lookup(&self, key: &str) -> SourceResult<String> {
        dispatch!(self, source => source.lookup(key))
    }

    fn is_encrypted(&self) -> bool {
        dispatch!(self, source => source.is_encrypted())
    }

    fn encrypt(&self, plaintext: &str) -> SourceResult<String> {
        dispatch!(self, source => source.encrypt(plaintext))
    }

    fn decrypt(&self, token: &str, ttl: Option<u64>) -> SourceResult<String> {
        dispatch!(self, source => source.decrypt(token, ttl))
    }
}

impl From<EnvSource> for Source {
    fn from(source: EnvSource) -> Self {
        Source::Env(source)
    }
}

impl From<FileSource> for Source {
    fn from(source: FileSource) -> Self {
        Source::File(source)
    }
}

impl From<DirSource> for Source {
    fn from(source: DirSource) -> Self {
        Source::Dir(source)
    }
}

impl From<SecretsDirSource> for Source {
    fn from(source: SecretsDirSource) -> Self {
        Source::SecretsDir(source)
    }
}
