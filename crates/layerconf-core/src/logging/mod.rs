//! Logging abstractions for resolver warnings

mod traits;
mod memory;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use memory::{LogLevel, MemoryLogger};
pub use tracing_logger::TracingLogger;
