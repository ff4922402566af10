use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::Deserialize;
use std::{collections::BTreeMap, path::PathBuf};
use tracing::debug;

use crate::{
    DEFAULT_REGION,
    env::{
        DATABASE_URL_VAR, DEFAULT_ENV_FILE, OPENAI_API_KEY_VAR, SECRET_KEY_VAR, config_values,
        read_env_file,
    },
    error::ConfigError,
    secret::SecretString,
};

/// Name of the optional configuration file in the infra project root.
pub const CONFIG_FILE: &str = "RecipehubInfra.toml";

/// Where to look for configuration values.
#[derive(Clone, Debug)]
pub struct ConfigOptions {
    /// Root directory of the infra project.
    pub app_dir: PathBuf,
    /// Env file to load, defaults to `../.env` relative to `app_dir`.
    pub env_file: Option<PathBuf>,
    /// Configuration file to load, defaults to `RecipehubInfra.toml` in `app_dir`.
    pub config_file: Option<PathBuf>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        ConfigOptions::new(".")
    }
}

impl ConfigOptions {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        ConfigOptions {
            app_dir: app_dir.into(),
            env_file: None,
            config_file: None,
        }
    }

    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| self.app_dir.join(DEFAULT_ENV_FILE))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.app_dir.join(CONFIG_FILE))
    }
}

/// Raw values as they come out of the configuration layers.
#[derive(Debug, Default, Deserialize)]
struct ConfigValues {
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    secret_key: Option<String>,
    #[serde(default)]
    openai_api_key: Option<String>,
}

/// Values needed to declare the backend stack.
///
/// Built once when the process starts and handed down explicitly,
/// nothing below the entry point reads the environment again.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub account: Option<String>,
    pub region: String,
    pub database_url: SecretString,
    pub secret_key: SecretString,
    pub openai_api_key: SecretString,
}

impl RuntimeConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let values: ConfigValues = figment.extract()?;
        RuntimeConfig::from_values(values)
    }

    fn from_values(values: ConfigValues) -> Result<Self, ConfigError> {
        let database_url = required(values.database_url, DATABASE_URL_VAR)?;
        let secret_key = required(values.secret_key, SECRET_KEY_VAR)?;
        let openai_api_key = required(values.openai_api_key, OPENAI_API_KEY_VAR)?;

        let region = values
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let account = values.account.filter(|a| !a.trim().is_empty());

        Ok(RuntimeConfig {
            account,
            region,
            database_url,
            secret_key,
            openai_api_key,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<SecretString, ConfigError> {
    match value.map(SecretString::from) {
        Some(secret) if !secret.is_blank() => Ok(secret),
        _ => Err(ConfigError::MissingValue(name)),
    }
}

/// Build the configuration layers, from lowest to highest precedence:
/// defaults, config file, env file and the given process variables.
pub fn runtime_config_figment<I, K, V>(
    options: &ConfigOptions,
    process_vars: I,
) -> Result<Figment, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut defaults = BTreeMap::new();
    defaults.insert("region", DEFAULT_REGION.to_string());

    let env_file = read_env_file(&options.env_file())?;
    let process = config_values(process_vars);

    let figment = Figment::new()
        .merge(Serialized::defaults(defaults))
        .merge(Toml::file(options.config_file()))
        .merge(Serialized::defaults(env_file))
        .merge(Serialized::defaults(process));

    Ok(figment)
}

/// Load the runtime configuration from the process environment.
pub fn load_runtime_config(options: &ConfigOptions) -> Result<RuntimeConfig, ConfigError> {
    // variables that aren't valid unicode can't hold any of our values
    let vars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    load_runtime_config_from(options, vars)
}

/// Load the runtime configuration using `process_vars` as the process environment.
pub fn load_runtime_config_from<I, K, V>(
    options: &ConfigOptions,
    process_vars: I,
) -> Result<RuntimeConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let figment = runtime_config_figment(options, process_vars)?;
    let config = RuntimeConfig::from_figment(&figment)?;
    debug!(?config, app_dir = ?options.app_dir, "loaded runtime configuration");
    Ok(config)
}
