//! Resolution of keys across layered sources
//!
//! This module provides:
//! - `Config`, the ordered resolver
//! - `Request` and `Fallback` describing a lookup
//! - `Resolution` records for introspection
//! - `Manifest` for building a resolver from YAML
//! - `config()`, the process-wide default

mod error;
mod request;
mod record;
mod config;
mod manifest;
mod global;

pub use error::{ConfigError, ConfigResult};
pub use request::{Fallback, Request};
pub use record::{Resolution, MASK};
pub use config::{Config, DebugGuard};
pub use manifest::Manifest;
pub use global::{config, DEBUG_ENV};
