// Configuration module for urlaction
// Reads from environment variables with sensible defaults

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Skip abstract classes when classifying controllers (URLACTION_SKIP_ABSTRACT)
    pub skip_abstract: bool,

    /// Suffix stripped from controller type names (URLACTION_CONTROLLER_SUFFIX)
    pub controller_suffix: String,

    /// Type count at which discovery fans out to the thread pool; 0 disables (URLACTION_PARALLEL_THRESHOLD)
    pub parallel_threshold: usize,

    /// Overall discovery timeout in milliseconds; 0 disables (URLACTION_TIMEOUT_MS)
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_abstract: true,
            controller_suffix: "Controller".to_string(),
            parallel_threshold: 256,
            timeout_ms: 0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();
        override_from_env("URLACTION_SKIP_ABSTRACT", &mut config.skip_abstract);
        override_from_env("URLACTION_PARALLEL_THRESHOLD", &mut config.parallel_threshold);
        override_from_env("URLACTION_TIMEOUT_MS", &mut config.timeout_ms);
        if let Ok(val) = env::var("URLACTION_CONTROLLER_SUFFIX") {
            config.controller_suffix = val;
        }
        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn override_from_env<T>(key: &str, slot: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    let Ok(val) = env::var(key) else {
        return;
    };
    match parse_value::<T>(&val) {
        Some(parsed) => *slot = parsed,
        None => warn!(
            "Invalid {} value: {}, using default: {}",
            key, val, slot
        ),
    }
}

fn parse_value<T: FromStr>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    // Accept the usual shell spellings for booleans.
    let normalized = match trimmed.to_ascii_lowercase().as_str() {
        "1" | "yes" | "on" if T::from_str("true").is_ok() && T::from_str("1").is_err() => {
            "true".to_string()
        }
        "0" | "no" | "off" if T::from_str("false").is_ok() && T::from_str("0").is_err() => {
            "false".to_string()
        }
        other => other.to_string(),
    };
    normalized.parse().ok()
}
