use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
    #[error("missing required configuration value `{0}`")]
    #[diagnostic(
        code(recipehub_infra::config::missing_value),
        help("export the variable or add it to the backend's .env file")
    )]
    MissingValue(&'static str),
    #[error("invalid environment file `{0}`")]
    InvalidEnvFile(PathBuf, #[source] dotenvy::Error),
    #[error("invalid configuration")]
    #[diagnostic(code(recipehub_infra::config::invalid))]
    InvalidConfig(#[source] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::InvalidConfig(Box::new(e))
    }
}
