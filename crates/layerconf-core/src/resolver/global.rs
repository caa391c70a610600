//! Process-wide default resolver

use std::env;

use once_cell::sync::Lazy;

use crate::cast::{Bool, Cast};
use super::config::Config;

/// Environment variable that enables debug mode on the default resolver
pub const DEBUG_ENV: &str = "LAYERCONF_DEBUG";

static DEFAULT: Lazy<Config> = Lazy::new(|| Config::new().env().with_debug(debug_from_env()));

/// Default resolver reading the process environment
///
/// Created on first use. Debug mode follows `LAYERCONF_DEBUG` at that point
/// and can be changed later with `set_debug` or `debug_scope`.
pub fn config() -> &'static Config {
    &DEFAULT
}

fn debug_from_env() -> bool {
    env::var(DEBUG_ENV)
        .ok()
        .and_then(|value| Bool.convert(&value).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{SourceKind, ValueSource};

    #[test]
    fn test_default_config_reads_process_env() {
        let config = config();
        assert_eq!(config.sources().len(), 1);
        assert_eq!(config.sources()[0].kind(), SourceKind::Env);
        assert_eq!(config.sources()[0].name(), "env");
        assert!(std::ptr::eq(config, super::config()));
    }

    #[test]
    fn test_debug_from_env() {
        env::set_var(DEBUG_ENV, "yes");
        assert!(debug_from_env());
        env::set_var(DEBUG_ENV, "sometimes");
        assert!(!debug_from_env());
        env::remove_var(DEBUG_ENV);
        assert!(!debug_from_env());
    }
}
