use crate::bundle::BundleError;
use crate::infrastructure::container::ContainerError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
    #[error("Application error: {0}")]
    Generic(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Config file '{0}' does not exist")]
    FileMissing(String),
    #[error("Environment variable '{0}' is not set and no default is configured")]
    EnvMissing(String),
    #[error("Unknown application mode '{0}'")]
    UnknownMode(String),
    #[error("Invalid value '{value}' for '{field}'")]
    InvalidValue { field: String, value: String },
}

/// Shorthand for `AppError::Generic`.
pub fn generic_error<S: Into<String>>(msg: S) -> AppError {
    AppError::Generic(msg.into())
}
