//! Environment sources and the profile selected during the env phase.

use crate::config::{AppConfig, ProfileConfig};
use crate::errors::ConfigError;
use std::collections::HashMap;

pub const APP_MODE_KEY: &str = "APP_MODE";
pub const APP_DEBUG_KEY: &str = "APP_DEBUG";

/// Read-only key/value view of the process environment.
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Result of the env phase: the active mode and its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub mode: String,
    pub debug: bool,
    pub log_level: Option<String>,
}

impl Environment {
    /// Pick the mode from `APP_MODE` (or the configured default), load its
    /// profile and apply the `APP_DEBUG` override.
    pub fn resolve(env: &dyn EnvSource, config: &AppConfig) -> Result<Self, ConfigError> {
        let mode = env
            .get(APP_MODE_KEY)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .or_else(|| config.default_mode.clone())
            .ok_or_else(|| ConfigError::EnvMissing(APP_MODE_KEY.to_string()))?;

        let profile = config
            .profiles
            .get(&mode)
            .cloned()
            .or_else(|| ProfileConfig::builtin(&mode))
            .ok_or_else(|| ConfigError::UnknownMode(mode.clone()))?;

        let debug = match env.get(APP_DEBUG_KEY) {
            Some(raw) => parse_flag(APP_DEBUG_KEY, &raw)?,
            None => profile.debug,
        };

        Ok(Self {
            mode,
            debug,
            log_level: profile.log_level,
        })
    }

    pub fn is_production(&self) -> bool {
        self.mode == "prod"
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}
