//! Lookup requests

/// What to use when no source holds the key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fallback {
    /// No default: the key is required
    #[default]
    Undefined,
    /// The default is "no value"; resolves to `None` without casting
    Null,
    /// A raw default, cast like a found value
    Value(String),
}

impl Fallback {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Fallback::Undefined)
    }
}

/// A key to resolve and how to treat it
///
/// # Example
///
/// ```
/// use layerconf_core::resolver::{Fallback, Request};
///
/// let request = Request::new("API_TOKEN").sensitive().ttl(3600);
/// assert!(request.is_sensitive());
/// assert_eq!(request.default, Fallback::Undefined);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub key: String,
    pub default: Fallback,
    /// Only encryption-capable sources are consulted and values are decrypted
    pub sensitive: bool,
    /// Maximum token age in seconds for sensitive values
    pub ttl: Option<u64>,
}

impl Request {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: Fallback::Undefined,
            sensitive: false,
            ttl: None,
        }
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Fallback::Value(value.into());
        self
    }

    pub fn null_default(mut self) -> Self {
        self.default = Fallback::Null;
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.default = fallback;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl From<&str> for Request {
    fn from(key: &str) -> Self {
        Request::new(key)
    }
}
