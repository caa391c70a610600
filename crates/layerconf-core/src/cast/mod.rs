//! Cast engine: raw strings to typed values
//!
//! - `Cast` trait and the `apply` entry point
//! - Scalars: `Raw`, `Bool`, `Parse<T>` (`Integer`, `Float`), `DurationCast`, `FnCast`
//! - Structured: `CommaSeparated`, `JsonDict`, `DatabaseUrl`

mod traits;
mod scalar;
mod composite;

pub use traits::{apply, Cast, CastError};
pub use scalar::{Bool, DurationCast, FnCast, Float, Integer, Parse, Raw};
pub use composite::{CommaSeparated, DatabaseConfig, DatabaseUrl, JsonDict};
