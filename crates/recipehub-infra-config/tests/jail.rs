// Jail tests live in their own module because they change the current
// directory and the process environment, which would make other tests
// that read `.env` files fail randomly.

use figment::Jail;

use recipehub_infra_config::{ConfigOptions, load_runtime_config};

#[test]
fn test_jail_process_environment() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        std::fs::create_dir("infra").map_err(|e| e.to_string())?;
        jail.create_file(
            ".env",
            r#"
            DATABASE_URL=postgres://from-file
            SECRET_KEY=file-secret
            OPENAI_API_KEY=file-key
            CDK_DEFAULT_REGION=eu-central-1
        "#,
        )?;

        jail.set_env("OPENAI_API_KEY", "process-key");
        jail.set_env("CDK_DEFAULT_ACCOUNT", "012345678901");

        let config = load_runtime_config(&ConfigOptions::new("infra")).unwrap();

        assert_eq!("postgres://from-file", config.database_url.expose());
        assert_eq!("file-secret", config.secret_key.expose());
        assert_eq!("process-key", config.openai_api_key.expose());
        assert_eq!("eu-central-1", config.region);
        assert_eq!(Some("012345678901"), config.account.as_deref());

        Ok(())
    });
}

#[test]
fn test_jail_config_file() {
    Jail::expect_with(|jail| {
        // the host environment outranks the config file
        jail.clear_env();
        std::fs::create_dir("infra").map_err(|e| e.to_string())?;
        jail.create_file(
            "infra/RecipehubInfra.toml",
            r#"
            region = "us-west-2"
            database_url = "postgres://from-toml"
            secret_key = "toml-secret"
            openai_api_key = "toml-key"
        "#,
        )?;

        let config = load_runtime_config(&ConfigOptions::new("infra")).unwrap();

        assert_eq!("us-west-2", config.region);
        assert_eq!("postgres://from-toml", config.database_url.expose());
        assert_eq!("toml-secret", config.secret_key.expose());
        assert_eq!("toml-key", config.openai_api_key.expose());
        assert_eq!(None, config.account);

        Ok(())
    });
}
