//! Sidecar configuration, read once from the environment at startup.
//!
//! - `PULSECHECK_WORKSPACE` - workspace directory opened at startup (optional)
//! - `PULSECHECK_CACHE_TTL_SECS` - snapshot cache lifetime (default: 300)
//! - `PULSECHECK_ACCESS_CODE` - code that unlocks the production table-set (default: lucky)
//! - `PULSECHECK_TEST_ACCESS_CODE` - code that unlocks the test table-set (default: testenv)
//! - `PULSECHECK_LOG` - tracing filter directive (default: info)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("access codes for production and test must differ")]
    SharedAccessCode,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub access_code: String,
    pub test_access_code: String,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            access_code: "lucky".to_string(),
            test_access_code: "testenv".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = present("PULSECHECK_WORKSPACE") {
            config.workspace = Some(PathBuf::from(v));
        }
        if let Some(v) = present("PULSECHECK_CACHE_TTL_SECS") {
            let secs = v.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("PULSECHECK_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = present("PULSECHECK_ACCESS_CODE") {
            config.access_code = v;
        }
        if let Some(v) = present("PULSECHECK_TEST_ACCESS_CODE") {
            config.test_access_code = v;
        }
        if let Some(v) = present("PULSECHECK_LOG") {
            config.log_filter = v;
        }

        if config.access_code == config.test_access_code {
            return Err(ConfigError::SharedAccessCode);
        }
        Ok(config)
    }
}
