//! Declarative source descriptions
//!
//! Used by manifests (YAML) and by the CLI's `--source` flag:
//!
//! ```text
//! env                       process environment
//! env@/etc/app.key          process environment, encrypted values
//! file:.env                 KEY=value file
//! file@.env.key:.env        KEY=value file with a key file
//! dir:/etc/app              one file per key
//! secrets:/run/secrets      mounted secrets volume
//! ```
//!
//! The form is `KIND[@KEYFILE][:PATH]`. Everything after the first `:` is the
//! path, so paths may contain `@` and `:`. A key file given this way cannot
//! contain `:`; use a manifest for such key files.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::Policy;
use super::{DirSource, EnvSource, FileSource, SecretsDirSource, Source};

/// Kind of source a spec builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Env,
    File,
    Dir,
    Secrets,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Env => "env",
            SourceKind::File => "file",
            SourceKind::Dir => "dir",
            SourceKind::Secrets => "secrets",
        }
    }

    fn needs_path(&self) -> bool {
        !matches!(self, SourceKind::Env)
    }
}

/// Errors from parsing or building a source spec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Unknown source kind: {0}")]
    UnknownKind(String),

    #[error("Source kind '{0}' requires a path")]
    MissingPath(&'static str),

    #[error("Source kind '{0}' does not take a path")]
    UnexpectedPath(&'static str),

    #[error("Source kind 'secrets' does not use a key file")]
    KeyFileNotAllowed,

    #[error("Empty key file in source spec '{0}'")]
    EmptyKeyFile(String),
}

/// Declarative description of one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub kind: SourceKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Key file making the source encryption-capable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Policy applied to `key_file`
    #[serde(default)]
    pub policy: Policy,
}

impl SourceSpec {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            path: None,
            key_file: None,
            policy: Policy::default(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>, policy: Policy) -> Self {
        self.key_file = Some(path.into());
        self.policy = policy;
        self
    }

    /// Construct the described source
    pub fn build(&self) -> Result<Source, SpecError> {
        let kind = self.kind.as_str();
        if self.kind.needs_path() && self.path.is_none() {
            return Err(SpecError::MissingPath(kind));
        }
        if !self.kind.needs_path() && self.path.is_some() {
            return Err(SpecError::UnexpectedPath(kind));
        }

        let key_file = self.key_file.clone();
        let source: Source = match (self.kind, self.path.clone()) {
            (SourceKind::Env, _) => {
                let source = EnvSource::new();
                match key_file {
                    Some(path) => source.key_file(path, self.policy).into(),
                    None => source.into(),
                }
            }
            (SourceKind::File, Some(path)) => {
                let source = FileSource::new(path);
                match key_file {
                    Some(path) => source.key_file(path, self.policy).into(),
                    None => source.into(),
                }
            }
            (SourceKind::Dir, Some(path)) => {
                let source = DirSource::new(path);
                match key_file {
                    Some(path) => source.key_file(path, self.policy).into(),
                    None => source.into(),
                }
            }
            (SourceKind::Secrets, Some(path)) => {
                if key_file.is_some() {
                    return Err(SpecError::KeyFileNotAllowed);
                }
                SecretsDirSource::new(path).into()
            }
            (_, None) => return Err(SpecError::MissingPath(kind)),
        };
        Ok(source)
    }
}

impl FromStr for SourceSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, path) = match s.split_once(':') {
            Some((head, path)) => (head, Some(path).filter(|p| !p.is_empty())),
            None => (s, None),
        };
        let (kind, key_file) = match head.split_once('@') {
            Some((_, "")) => return Err(SpecError::EmptyKeyFile(s.to_string())),
            Some((kind, key_file)) => (kind, Some(key_file)),
            None => (head, None),
        };

        let kind = match kind.to_lowercase().as_str() {
            "env" => SourceKind::Env,
            "file" => SourceKind::File,
            "dir" => SourceKind::Dir,
            "secrets" => SourceKind::Secrets,
            other => return Err(SpecError::UnknownKind(other.to_string())),
        };

        let mut spec = SourceSpec::new(kind);
        spec.path = path.map(PathBuf::from);
        spec.key_file = key_file.map(PathBuf::from);

        if kind.needs_path() && spec.path.is_none() {
            return Err(SpecError::MissingPath(kind.as_str()));
        }
        if !kind.needs_path() && spec.path.is_some() {
            return Err(SpecError::UnexpectedPath(kind.as_str()));
        }
        Ok(spec)
    }
}

impl std::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(key_file) = &self.key_file {
            write!(f, "@{}", key_file.display())?;
        }
        if let Some(path) = &self.path {
            write!(f, ":{}", path.display())?;
        }
        Ok(())
    }
}
