use std::{fs, path::Path, path::PathBuf};

use crate::environment::EnvSource;
use crate::errors::ConfigError;

use super::app_config::{AppConfig, CONFIG_FILE_NAME, CONFIG_PATH_ENV};

/// Configuration loader responsible for locating and parsing `kernel.toml`
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader that looks in the working directory
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }

    /// Load configuration.
    ///
    /// Lookup order: `explicit`, then `APPKERNEL_CONFIG`, then
    /// `kernel.toml` under the base path. The first two must exist; a missing
    /// default file yields the default configuration.
    pub fn load(&self, explicit: Option<&Path>, env: &dyn EnvSource) -> Result<AppConfig, ConfigError> {
        let config = if let Some(path) = explicit {
            self.load_required(path)?
        } else if let Some(path) = env.get(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            self.load_required(Path::new(&path))?
        } else {
            let default_path = self.default_path();
            if default_path.exists() {
                self.load_from_path(&default_path)?
            } else {
                tracing::debug!(path = %default_path.display(), "no config file, using defaults");
                AppConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn default_path(&self) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        }
    }

    fn load_required(&self, path: &Path) -> Result<AppConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileMissing(path.to_string_lossy().to_string()));
        }
        self.load_from_path(path)
    }

    /// Read and parse one TOML file
    pub fn load_from_path(&self, path: &Path) -> Result<AppConfig, ConfigError> {
        let origin = path.to_string_lossy().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileRead(origin.clone(), e))?;
        tracing::info!(path = %origin, "loading kernel config");
        parse_config(&content, &origin)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse TOML content; `origin` only shows up in errors.
pub fn parse_config(content: &str, origin: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::TomlParse(origin.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app_config::abs_template_path;
    use crate::environment::MapEnv;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
app_name = "web"
default_mode = "dev"
imports = ["audit"]

[[bundle]]
name = "core"

[[bundle]]
key = "storage"
name = "sqlite-storage"

[loaders]
default_loader = "container"

[loaders.routes]
audit = "events"

[loaders.apps]
console = ["container"]

[profiles.dev]
debug = true
log_level = "trace"
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE, "sample").unwrap();
        assert_eq!(config.app_name.as_deref(), Some("web"));
        assert_eq!(config.bundles.len(), 2);
        assert_eq!(config.bundles[1].key.as_deref(), Some("storage"));
        assert_eq!(config.imports, vec!["audit".to_string()]);
        assert_eq!(config.loaders.route("audit"), "events");
        assert_eq!(config.loaders.apps["console"], vec!["container".to_string()]);
        assert_eq!(config.profiles["dev"].log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = parse_config("bundle = 3", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(ref origin, _) if origin == "broken.toml"));
    }

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_base_path(dir.path().to_path_buf());
        let config = loader.load(None, &MapEnv::new()).unwrap();
        assert!(config.bundles.is_empty());
        assert_eq!(config.loaders.default_loader, "container");
    }

    #[test]
    fn test_default_file_under_base_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), SAMPLE).unwrap();
        let loader = ConfigLoader::with_base_path(dir.path().to_path_buf());
        let config = loader.load(None, &MapEnv::new()).unwrap();
        assert_eq!(config.bundles.len(), 2);
    }

    #[test]
    fn test_env_path_override() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "app_name = \"console\"").unwrap();
        let env = MapEnv::new().with(CONFIG_PATH_ENV, custom.to_string_lossy());

        let config = ConfigLoader::with_base_path(dir.path().to_path_buf())
            .load(None, &env)
            .unwrap();
        assert_eq!(config.app_name.as_deref(), Some("console"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let result = ConfigLoader::new().load(Some(&dir.path().join("nope.toml")), &MapEnv::new());
        assert!(matches!(result, Err(ConfigError::FileMissing(_))));
    }

    #[test]
    fn test_example_template_parses() {
        let config = ConfigLoader::new()
            .load(Some(&abs_template_path()), &MapEnv::new())
            .unwrap();
        assert!(!config.bundles.is_empty());
    }
}
