use std::{collections::BTreeMap, path::Path};
use tracing::debug;

use crate::error::ConfigError;

/// Location of the backend's env file, relative to the infra project root.
pub const DEFAULT_ENV_FILE: &str = "../.env";

pub const ACCOUNT_VAR: &str = "CDK_DEFAULT_ACCOUNT";
pub const REGION_VAR: &str = "CDK_DEFAULT_REGION";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Map an environment variable name to the configuration key it sets.
pub fn config_key(var: &str) -> Option<&'static str> {
    match var {
        ACCOUNT_VAR => Some("account"),
        REGION_VAR => Some("region"),
        DATABASE_URL_VAR => Some("database_url"),
        SECRET_KEY_VAR => Some("secret_key"),
        OPENAI_API_KEY_VAR => Some("openai_api_key"),
        _ => None,
    }
}

/// Keep the variables that the stack cares about, keyed by configuration key.
/// Values are kept as strings, account ids with leading zeros included.
pub fn config_values<I, K, V>(vars: I) -> BTreeMap<&'static str, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    vars.into_iter()
        .filter_map(|(k, v)| config_key(k.as_ref()).map(|key| (key, v.into())))
        .collect()
}

/// Read the variables from an env file.
///
/// A missing file yields no variables, like dotenv does.
/// Unquoted values run to the end of the line, so urls with query
/// strings and values containing `=` don't need quoting.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<&'static str, String>, ConfigError> {
    if !path.is_file() {
        debug!(path = ?path, "env file not found, skipping");
        return Ok(BTreeMap::new());
    }

    let vars = dotenvy::from_path_iter(path)
        .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
        .map_err(|e| ConfigError::InvalidEnvFile(path.into(), e))?;
    let values = config_values(vars);
    debug!(path = ?path, keys = ?values.keys().collect::<Vec<_>>(), "loaded env file");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_values_ignores_unknown_variables() {
        let vars = vec![
            ("DATABASE_URL", "postgres://x"),
            ("HOME", "/root"),
            ("CDK_DEFAULT_ACCOUNT", "012345678901"),
        ];
        let values = config_values(vars);

        assert_eq!(2, values.len());
        assert_eq!("postgres://x", values["database_url"]);
        assert_eq!("012345678901", values["account"]);
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let values = read_env_file(&dir.path().join(".env")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_read_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".env");
        std::fs::write(
            &file,
            "DATABASE_URL=postgres://x\n\nexport SECRET_KEY = 's1'\n#OPENAI_API_KEY=ignored\nDEBUG=true",
        )
        .unwrap();

        let values = read_env_file(&file).unwrap();

        assert_eq!("postgres://x", values["database_url"]);
        assert_eq!("s1", values["secret_key"]);
        assert!(!values.contains_key("openai_api_key"));
        assert_eq!(2, values.len());
    }

    #[test]
    fn test_read_env_file_unquoted_urls() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".env");
        std::fs::write(
            &file,
            "DATABASE_URL=postgresql://u:p@h:5432/db?sslmode=require&channel_binding=require\nSECRET_KEY=a=b\n",
        )
        .unwrap();

        let values = read_env_file(&file).unwrap();

        assert_eq!(
            "postgresql://u:p@h:5432/db?sslmode=require&channel_binding=require",
            values["database_url"]
        );
        assert_eq!("a=b", values["secret_key"]);
    }

    #[test]
    fn test_malformed_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".env");
        std::fs::write(&file, "DATABASE_URL=postgres://x\nNOT A VALID LINE\n").unwrap();

        let err = read_env_file(&file).unwrap_err();
        match err {
            ConfigError::InvalidEnvFile(path, _) => assert_eq!(file, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
