use crate::bundle::BundleEntry;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "kernel.toml";
pub const CONFIG_PATH_ENV: &str = "APPKERNEL_CONFIG";
pub const DEFAULT_LOADER: &str = "container";

const TEMPLATE_CONFIG_FILE: &str = "assets/kernel.example.toml";

/// Kernel configuration as read from `kernel.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub app_name: Option<String>,
    pub default_mode: Option<String>,
    #[serde(rename = "bundle")]
    pub bundles: Vec<BundleSpec>,
    pub imports: Vec<String>,
    pub loaders: LoaderConfig,
    pub profiles: HashMap<String, ProfileConfig>,
    pub logging: LoggingSection,
}

/// One `[[bundle]]` table. Without a key the bundle is positional.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BundleSpec {
    pub key: Option<String>,
    pub name: String,
}

impl From<&BundleSpec> for BundleEntry {
    fn from(spec: &BundleSpec) -> Self {
        match &spec.key {
            Some(key) => BundleEntry::keyed(key.clone(), spec.name.clone()),
            None => BundleEntry::positional(spec.name.clone()),
        }
    }
}

/// Which loader strategy handles which bundle, and which strategies each
/// application runs.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Strategy for bundles without an explicit route.
    pub default_loader: String,
    /// Bundle name to strategy name.
    pub routes: HashMap<String, String>,
    /// Application name to the strategies enabled for it. Apps without an
    /// entry run every registered strategy.
    pub apps: HashMap<String, Vec<String>>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_loader: DEFAULT_LOADER.to_string(),
            routes: HashMap::new(),
            apps: HashMap::new(),
        }
    }
}

impl LoaderConfig {
    /// Strategy name for `bundle`.
    pub fn route(&self, bundle: &str) -> &str {
        self.routes
            .get(bundle)
            .map(String::as_str)
            .unwrap_or(&self.default_loader)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub debug: bool,
    pub log_level: Option<String>,
}

impl ProfileConfig {
    /// Profiles available without configuration.
    pub fn builtin(mode: &str) -> Option<Self> {
        let (debug, level) = match mode {
            "dev" => (true, "debug"),
            "test" => (true, "error"),
            "prod" => (false, "info"),
            _ => return None,
        };
        Some(Self {
            debug,
            log_level: Some(level.to_string()),
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub format: Option<String>,
    pub level: Option<String>,
}

impl AppConfig {
    pub fn bundle_entries(&self) -> Vec<BundleEntry> {
        self.bundles.iter().map(BundleEntry::from).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loaders.default_loader.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "loaders.default_loader".to_string(),
                value: self.loaders.default_loader.clone(),
            });
        }
        if let Some(bundle) = self.bundles.iter().find(|b| b.name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "bundle.name".to_string(),
                value: bundle.name.clone(),
            });
        }
        Ok(())
    }
}

/// Absolute path of the bundled example config.
pub fn abs_template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(TEMPLATE_CONFIG_FILE)
}
