use clap::{Args, ValueHint};
use miette::Result;
use recipehub_infra_config::{ConfigOptions, RuntimeConfig, load_runtime_config};
use recipehub_infra_stack::{RecipehubStackProps, STACK_NAME, Stack, StackEnvironment};
use std::path::{Path, PathBuf};

/// Build context of the backend image, relative to the app dir.
const BUILD_CONTEXT: &str = "..";

#[derive(Args, Clone, Debug)]
pub(crate) struct AppOptions {
    /// Root directory of the infra project
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub(crate) app_dir: PathBuf,

    /// Read environment variables from this file instead of `../.env`
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub(crate) env_file: Option<PathBuf>,
}

impl AppOptions {
    /// Load the runtime configuration and declare the backend stack with it.
    pub(crate) fn build_stack(&self) -> Result<Stack> {
        let options = ConfigOptions {
            env_file: self.env_file.clone(),
            ..ConfigOptions::new(&self.app_dir)
        };

        let config = load_runtime_config(&options)?;
        let stack = Stack::recipehub(STACK_NAME, stack_props(&self.app_dir, config))?;
        Ok(stack)
    }
}

fn stack_props(app_dir: &Path, config: RuntimeConfig) -> RecipehubStackProps {
    RecipehubStackProps {
        env: StackEnvironment {
            account: config.account,
            region: config.region,
        },
        build_context: app_dir.join(BUILD_CONTEXT),
        database_url: config.database_url.into_inner(),
        secret_key: config.secret_key.into_inner(),
        openai_api_key: config.openai_api_key.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_props() {
        let config = RuntimeConfig {
            account: None,
            region: "us-east-1".into(),
            database_url: "postgres://x".into(),
            secret_key: "s1".into(),
            openai_api_key: "k1".into(),
        };

        let props = stack_props(Path::new("/backend/infra"), config);

        assert_eq!(Path::new("/backend/infra/.."), props.build_context);
        assert_eq!(None, props.env.account);
        assert_eq!("us-east-1", props.env.region);
        assert_eq!("postgres://x", props.database_url);
        assert_eq!("s1", props.secret_key);
        assert_eq!("k1", props.openai_api_key);
    }
}
