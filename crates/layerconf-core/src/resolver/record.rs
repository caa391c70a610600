//! Resolution records
//!
//! Every successful resolution is recorded so callers can inspect what was
//! defined, where it came from and whether a default was used.

use serde::Serialize;
use serde_json::Value;

/// Mask shown in place of sensitive values
pub const MASK: &str = "********";

/// How one key was resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// The string as found in the source (still encrypted for sensitive
    /// keys), or the raw default; `None` for a null default
    pub raw: Option<String>,
    /// The cast value
    pub value: Value,
    /// Name of the source that held the key; `None` when a default was used
    pub source: Option<String>,
    pub default_used: bool,
    pub sensitive: bool,
    pub ttl: Option<u64>,
}

impl Resolution {
    /// Value for display, masked when sensitive
    pub fn display_value(&self) -> String {
        if self.sensitive && !self.value.is_null() {
            return MASK.to_string();
        }
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Where the value came from, for display
    pub fn origin(&self) -> &str {
        match &self.source {
            Some(source) => source,
            None if self.default_used => "default",
            None => "-",
        }
    }
}
