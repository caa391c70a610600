//! Logger that forwards to `tracing`

use super::traits::Logger;

/// Default logger: every message becomes a `tracing` event
///
/// Events are emitted with target `layerconf`, so a subscriber filter such as
/// `layerconf=warn` selects resolver warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "layerconf", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "layerconf", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "layerconf", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "layerconf", "{}", message);
    }
}
