use serde_json::Value;
use snapbox::cmd::Command;
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};
use tempfile::TempDir;

const CONFIG_VARS: [&str; 5] = [
    "CDK_DEFAULT_ACCOUNT",
    "CDK_DEFAULT_REGION",
    "DATABASE_URL",
    "SECRET_KEY",
    "OPENAI_API_KEY",
];

/// A backend project with a Dockerfile, an env file and an empty infra directory.
fn backend(env: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temporary directory");
    write(
        dir.path().join("Dockerfile"),
        "FROM public.ecr.aws/lambda/python:3.12\n",
    )
    .unwrap();
    write(dir.path().join(".env"), env).unwrap();

    let infra = dir.path().join("infra");
    create_dir_all(&infra).unwrap();
    (dir, infra)
}

fn recipehub_infra(subcommand: &str, app_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recipehub-infra"));
    for var in CONFIG_VARS {
        cmd = cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .arg(subcommand)
        .arg("--app-dir")
        .arg(app_dir)
}

#[test]
fn test_synth_writes_cloud_assembly() {
    let (_dir, infra) = backend("DATABASE_URL=postgres://x\nSECRET_KEY=s1\nOPENAI_API_KEY=k1\n");

    let assert = recipehub_infra("synth", &infra).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let template: Value = serde_json::from_str(&stdout).expect("stdout is not a template");

    let out = infra.join("cdk.out");
    assert!(out.join("manifest.json").is_file());
    assert!(out.join("RecipehubBackendStack.template.json").is_file());
    assert!(out.join("RecipehubBackendStack.assets.json").is_file());

    let written: Value = serde_json::from_str(
        &read_to_string(out.join("RecipehubBackendStack.template.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(template, written);

    let resources = template["Resources"].as_object().unwrap();
    let functions = resources
        .values()
        .filter(|r| r["Type"] == "AWS::Lambda::Function")
        .collect::<Vec<_>>();
    assert_eq!(1, functions.len());

    let variables = &functions[0]["Properties"]["Environment"]["Variables"];
    assert_eq!("postgres://x", variables["DATABASE_URL"]);
    assert_eq!("s1", variables["SECRET_KEY"]);
    assert_eq!("k1", variables["OPENAI_API_KEY"]);

    let outputs = template["Outputs"].as_object().unwrap();
    assert_eq!(1, outputs.len());
    assert_eq!("RecipehubApiUrl", outputs["ApiUrl"]["Export"]["Name"]);

    let manifest: Value =
        serde_json::from_str(&read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(
        "aws://unknown-account/us-east-1",
        manifest["artifacts"]["RecipehubBackendStack"]["environment"]
    );
}

#[test]
fn test_synth_with_region_from_environment() {
    let (_dir, infra) = backend("DATABASE_URL=postgres://x\nSECRET_KEY=s1\nOPENAI_API_KEY=k1\n");

    recipehub_infra("synth", &infra)
        .env("CDK_DEFAULT_REGION", "eu-west-1")
        .env("CDK_DEFAULT_ACCOUNT", "123456789012")
        .args(["--quiet", "--output", "assembly"])
        .assert()
        .success();

    let manifest: Value = serde_json::from_str(
        &read_to_string(infra.join("assembly/manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        "aws://123456789012/eu-west-1",
        manifest["artifacts"]["RecipehubBackendStack"]["environment"]
    );
}

#[test]
fn test_synth_fails_without_secrets() {
    let (_dir, infra) = backend("DATABASE_URL=postgres://x\nSECRET_KEY=s1\n");

    recipehub_infra("synth", &infra).assert().failure();

    assert!(!infra.join("cdk.out").exists());
}

#[test]
fn test_synth_with_explicit_env_file() {
    let (dir, infra) = backend("");
    let env_file = dir.path().join("production.env");
    write(
        &env_file,
        "DATABASE_URL=postgres://prod\nSECRET_KEY=s2\nOPENAI_API_KEY=k2\n",
    )
    .unwrap();

    recipehub_infra("synth", &infra)
        .arg("--env-file")
        .arg(&env_file)
        .arg("--quiet")
        .assert()
        .success();

    assert!(infra.join("cdk.out/manifest.json").is_file());
}

#[test]
fn test_list_stacks() {
    let (_dir, infra) = backend("DATABASE_URL=postgres://x\nSECRET_KEY=s1\nOPENAI_API_KEY=k1\n");

    let assert = recipehub_infra("list", &infra).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert_eq!("RecipehubBackendStack", stdout.trim());
}
