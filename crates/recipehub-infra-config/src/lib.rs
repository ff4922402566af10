pub mod config;
pub mod env;
pub mod error;
pub mod secret;

pub use config::{ConfigOptions, RuntimeConfig, load_runtime_config};
pub use error::ConfigError;
pub use secret::SecretString;

/// Region used when `CDK_DEFAULT_REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-1";
