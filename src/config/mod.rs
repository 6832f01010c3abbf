pub mod app_config;
pub mod loader;

pub use app_config::{AppConfig, BundleSpec, LoaderConfig, LoggingSection, ProfileConfig};
pub use app_config::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, DEFAULT_LOADER};
pub use loader::{parse_config, ConfigLoader};
