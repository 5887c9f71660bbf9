//! Runtime configuration from environment variables.

use std::path::PathBuf;

use tracing::warn;

use crate::data::roster::DEFAULT_ROSTER_PATH;

pub const BIND_ENV: &str = "HEADCOUNT_BIND";
pub const ROSTER_PATH_ENV: &str = "HEADCOUNT_ROSTER_PATH";
pub const DEFAULT_HEADCOUNT_ENV: &str = "HEADCOUNT_DEFAULT_HEADCOUNT";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
/// Initial headcount when a request does not name one (clamped to roster size).
pub const DEFAULT_HEADCOUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub roster_path: PathBuf,
    pub default_headcount: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            roster_path: PathBuf::from(DEFAULT_ROSTER_PATH),
            default_headcount: DEFAULT_HEADCOUNT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset; an unparsable
    /// headcount falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let default_headcount = match get(DEFAULT_HEADCOUNT_ENV) {
            Some(raw) => raw.parse::<usize>().unwrap_or_else(|_| {
                warn!(
                    variable = DEFAULT_HEADCOUNT_ENV,
                    value = %raw,
                    fallback = DEFAULT_HEADCOUNT,
                    "invalid headcount, using default"
                );
                DEFAULT_HEADCOUNT
            }),
            None => defaults.default_headcount,
        };

        Config {
            bind_addr: get(BIND_ENV).unwrap_or(defaults.bind_addr),
            roster_path: get(ROSTER_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.roster_path),
            default_headcount,
        }
    }

    pub fn with_roster_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.roster_path = path.into();
        self
    }
}
