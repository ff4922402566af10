use miette::Diagnostic;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
pub enum StackError {
    #[error("stack property `{0}` cannot be empty")]
    #[diagnostic(code(recipehub_infra::stack::empty_property))]
    EmptyProperty(&'static str),
    #[error("invalid memory value `{0}`, it must be between 128 and 10240 MB")]
    InvalidMemory(u32),
    #[error("invalid timeout value `{0}`, it must be between 1 and 900 seconds")]
    InvalidTimeout(u32),
    #[error("invalid number `{0}`")]
    InvalidNumber(String, #[source] std::num::ParseIntError),
    #[error("function `{0}` already has a function url")]
    DuplicateFunctionUrl(String),
    #[error("output `{0}` refers to a function without a function url")]
    UnresolvedOutput(String),
}

#[derive(Debug, Diagnostic, Error)]
pub enum AssemblyError {
    #[error("build context `{0}` does not exist")]
    #[diagnostic(
        code(recipehub_infra::assembly::missing_build_context),
        help("the backend project must be the parent directory of the infra project")
    )]
    MissingBuildContext(PathBuf, #[source] io::Error),
    #[error("build context `{0}` is not a directory")]
    InvalidBuildContext(PathBuf),
    #[error("failed to read `{0}` from the build context")]
    ReadAsset(PathBuf, #[source] io::Error),
    #[error("failed to walk the build context")]
    WalkBuildContext(#[from] walkdir::Error),
    #[error("invalid .dockerignore file")]
    InvalidIgnoreFile(#[from] ignore::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Stack(#[from] StackError),
    #[error("failed to serialize `{0}`")]
    Serialize(String, #[source] serde_json::Error),
    #[error("failed to write `{0}`")]
    WriteAssembly(PathBuf, #[source] io::Error),
}
