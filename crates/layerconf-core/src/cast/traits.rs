//! Cast trait and error type

use serde::Serialize;
use thiserror::Error;

/// A raw value could not be converted to the requested type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot cast {key} value {value:?} to {type_name}: {reason}")]
pub struct CastError {
    pub key: String,
    pub type_name: String,
    pub value: String,
    pub reason: String,
}

impl CastError {
    /// Replace the offending value so secrets never reach error messages
    pub fn redacted(mut self) -> Self {
        self.value = "********".to_string();
        self
    }
}

/// Conversion from a source's raw string to a semantic type
///
/// The output must be serializable so resolved values can be recorded for
/// introspection alongside values of other types.
pub trait Cast {
    type Output: Serialize;

    /// Name used in error messages
    fn type_name(&self) -> &str;

    /// Convert `raw`, describing the failure on error
    fn convert(&self, raw: &str) -> Result<Self::Output, String>;
}

impl<C: Cast + ?Sized> Cast for &C {
    type Output = C::Output;

    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn convert(&self, raw: &str) -> Result<Self::Output, String> {
        (**self).convert(raw)
    }
}

/// Cast `raw` for `key`, wrapping failures in a `CastError`
pub fn apply<C: Cast + ?Sized>(cast: &C, key: &str, raw: &str) -> Result<C::Output, CastError> {
    cast.convert(raw).map_err(|reason| CastError {
        key: key.to_string(),
        type_name: cast.type_name().to_string(),
        value: raw.to_string(),
        reason,
    })
}
