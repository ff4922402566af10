use ignore::gitignore::{Gitignore, GitignoreBuilder};
use sha2::{Digest, Sha256};
use std::{
    fs::{read, read_to_string},
    path::{Path, PathBuf},
};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::AssemblyError;

/// Repository created by the account bootstrap to hold container assets.
pub const CONTAINER_ASSETS_REPOSITORY: &str =
    "cdk-hnb659fds-container-assets-${AWS::AccountId}-${AWS::Region}";

const DOCKER_IGNORE_FILE: &str = ".dockerignore";
const ALWAYS_EXCLUDED: &[&str] = &[".git"];

/// Container image built from a local directory, identified by the hash of its contents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DockerImageAsset {
    directory: PathBuf,
    hash: String,
}

impl DockerImageAsset {
    pub fn new(directory: impl Into<PathBuf>, hash: impl Into<String>) -> Self {
        DockerImageAsset {
            directory: directory.into(),
            hash: hash.into(),
        }
    }

    /// Fingerprint `directory`, leaving out anything under `exclude`.
    pub fn from_directory(directory: &Path, exclude: &[PathBuf]) -> Result<Self, AssemblyError> {
        let directory = dunce::canonicalize(directory)
            .map_err(|e| AssemblyError::MissingBuildContext(directory.into(), e))?;
        let hash = fingerprint(&directory, exclude)?;
        debug!(directory = ?directory, hash = %hash, "fingerprinted docker image asset");
        Ok(DockerImageAsset::new(directory, hash))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn image_tag(&self) -> &str {
        &self.hash
    }

    /// Image location, with placeholders for `Fn::Sub`.
    pub fn image_uri(&self) -> String {
        format!(
            "${{AWS::AccountId}}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/{CONTAINER_ASSETS_REPOSITORY}:{}",
            self.image_tag()
        )
    }
}

/// Hash the relative path and the content of every file in `root`.
///
/// Files are visited in name order, so the hash only changes when
/// the contents change. `.git`, anything under `exclude` and anything
/// matched by the directory's `.dockerignore` are skipped.
pub fn fingerprint(root: &Path, exclude: &[PathBuf]) -> Result<String, AssemblyError> {
    let root = &dunce::canonicalize(root)
        .map_err(|e| AssemblyError::MissingBuildContext(root.into(), e))?;
    if !root.is_dir() {
        return Err(AssemblyError::InvalidBuildContext(root.into()));
    }

    let exclude = exclude
        .iter()
        .filter_map(|p| dunce::canonicalize(p).ok())
        .collect::<Vec<_>>();
    let ignore = docker_ignore(root)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, root, &exclude, &ignore));

    let mut hasher = Sha256::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_path(root, entry.path());
        trace!(file = %relative, "adding file to fingerprint");

        let data = read(entry.path())
            .map_err(|e| AssemblyError::ReadAsset(entry.path().into(), e))?;
        hasher.update(relative.as_bytes());
        hasher.update([0]);
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(&data);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

// Docker matches every pattern from the root of the context, so `venv`
// only excludes `./venv` while gitignore would exclude it at any depth.
fn docker_ignore(root: &Path) -> Result<Gitignore, AssemblyError> {
    let mut builder = GitignoreBuilder::new(root);
    let file = root.join(DOCKER_IGNORE_FILE);
    if file.is_file() {
        let contents = read_to_string(&file).map_err(|e| AssemblyError::ReadAsset(file, e))?;
        for line in contents.lines().filter_map(anchored_pattern) {
            builder.add_line(None, &line)?;
        }
    }
    Ok(builder.build()?)
}

fn anchored_pattern(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negate, pattern) = match line.strip_prefix('!') {
        Some(pattern) => ("!", pattern.trim()),
        None => ("", line),
    };
    let pattern = pattern.trim_start_matches('/');
    if pattern.is_empty() {
        return None;
    }

    if pattern.starts_with("**") {
        Some(format!("{negate}{pattern}"))
    } else {
        Some(format!("{negate}/{pattern}"))
    }
}

fn is_excluded(
    entry: &DirEntry,
    root: &Path,
    exclude: &[PathBuf],
    ignore: &Gitignore,
) -> bool {
    let path = entry.path();
    if path == root {
        return false;
    }

    let is_dir = entry.file_type().is_dir();
    if is_dir && ALWAYS_EXCLUDED.iter().any(|name| entry.file_name() == *name) {
        return true;
    }

    if exclude.iter().any(|e| path.starts_with(e)) {
        return true;
    }

    ignore.matched_path_or_any_parents(path, is_dir).is_ignore()
}

// Separators are normalized so the hash is the same on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
