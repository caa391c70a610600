//! Filesystem policy for credential-bearing files
//!
//! A key file is only read after its owner and permission bits pass the
//! source's `Policy`. Violations are hard errors: the resolver never falls
//! through to another source when a key file is exposed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission rule applied to a key file before it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Owned by the effective user, no group or other permission bits
    #[default]
    OwnerOnly,
    /// No permission bits for other users
    OwnerOrGroup,
}

/// Errors raised when a path fails its policy
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Cannot inspect {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is owned by uid {owner}, expected uid {uid}")]
    NotOwner { path: PathBuf, owner: u32, uid: u32 },

    #[error("{path} has mode {mode:o}, which the {policy} policy does not allow")]
    Permissions {
        path: PathBuf,
        mode: u32,
        policy: Policy,
    },
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::OwnerOnly => "owner-only",
            Policy::OwnerOrGroup => "owner-or-group",
        }
    }

    /// Permission bits that must be clear
    #[cfg_attr(not(unix), allow(dead_code))]
    fn forbidden_bits(&self) -> u32 {
        match self {
            Policy::OwnerOnly => 0o077,
            Policy::OwnerOrGroup => 0o007,
        }
    }

    /// Check `path` against this policy
    #[cfg(unix)]
    pub fn check(&self, path: &Path) -> Result<(), PolicyError> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(path).map_err(|source| PolicyError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        if *self == Policy::OwnerOnly {
            let uid = nix::unistd::geteuid().as_raw();
            if metadata.uid() != uid {
                return Err(PolicyError::NotOwner {
                    path: path.to_path_buf(),
                    owner: metadata.uid(),
                    uid,
                });
            }
        }

        let mode = metadata.mode() & 0o777;
        if mode & self.forbidden_bits() != 0 {
            return Err(PolicyError::Permissions {
                path: path.to_path_buf(),
                mode,
                policy: *self,
            });
        }

        tracing::debug!(path = %path.display(), policy = self.as_str(), "policy check passed");
        Ok(())
    }

    /// Permission bits and ownership do not exist outside unix; only
    /// existence is checked.
    #[cfg(not(unix))]
    pub fn check(&self, path: &Path) -> Result<(), PolicyError> {
        std::fs::metadata(path).map_err(|source| PolicyError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
