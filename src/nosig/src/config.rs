use std::str::FromStr;

use logger::LevelFilter;

pub const LOG_LEVEL_ENV: &str = "NOSIG_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
    }

    /// Errors are always reported, so levels below `error` are raised to it.
    pub fn from_value(log_level: Option<&str>) -> Self {
        let level = log_level
            .and_then(|level| LevelFilter::from_str(level.trim()).ok())
            .unwrap_or_else(|| Self::default().log_level);
        Self {
            log_level: std::cmp::max(level, LevelFilter::Error),
        }
    }
}
