//! Resolver error type

use thiserror::Error;

use crate::cast::CastError;
use crate::policy::PolicyError;
use crate::sources::SourceError;

/// Errors returned by `Config`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No source held the key and no default was given
    #[error("{key} is not defined; checked: {}", .checked.join(", "))]
    Missing { key: String, checked: Vec<String> },

    /// A key file failed its policy check; never skipped
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Source(SourceError),

    #[error("No source at index {index} ({count} configured)")]
    NoSource { index: usize, count: usize },

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<SourceError> for ConfigError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Policy(err) => ConfigError::Policy(err),
            other => ConfigError::Source(other),
        }
    }
}
