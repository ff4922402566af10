use serde::Serialize;
use serde_json::{Value, json};
use std::{
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    asset::{CONTAINER_ASSETS_REPOSITORY, DockerImageAsset},
    error::AssemblyError,
    stack::Stack,
    template::Template,
};

/// Version of the cloud assembly schema written in the manifests.
pub const ASSEMBLY_VERSION: &str = "36.0.0";
pub const MANIFEST_FILE: &str = "manifest.json";
const ASSET_DESTINATION: &str = "current_account-current_region";

/// Everything the provisioning engine needs to deploy a stack.
#[derive(Clone, Debug)]
pub struct CloudAssembly {
    stack_name: String,
    environment: String,
    template: Template,
    image: DockerImageAsset,
}

impl Stack {
    /// Fingerprint the function's build context and render the template.
    ///
    /// `out_dir` is left out of the fingerprint in case it lives inside
    /// the build context.
    pub fn synthesize(&self, out_dir: &Path) -> Result<CloudAssembly, AssemblyError> {
        let build_context = self.function().code().directory();
        let image = DockerImageAsset::from_directory(build_context, &[out_dir.to_path_buf()])?;
        let template = self.template(&image)?;

        Ok(CloudAssembly {
            stack_name: self.name().to_string(),
            environment: self.env().to_string(),
            template,
            image,
        })
    }
}

impl CloudAssembly {
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn image(&self) -> &DockerImageAsset {
        &self.image
    }

    pub fn template_file(&self) -> String {
        format!("{}.template.json", self.stack_name)
    }

    pub fn assets_file(&self) -> String {
        format!("{}.assets.json", self.stack_name)
    }

    pub fn manifest(&self) -> Value {
        let assets_artifact = format!("{}.assets", self.stack_name);
        json!({
            "version": ASSEMBLY_VERSION,
            "artifacts": {
                assets_artifact.as_str(): {
                    "type": "cdk:asset-manifest",
                    "properties": { "file": self.assets_file() }
                },
                self.stack_name.as_str(): {
                    "type": "aws:cloudformation:stack",
                    "environment": self.environment,
                    "properties": { "templateFile": self.template_file() },
                    "dependencies": [assets_artifact]
                }
            }
        })
    }

    pub fn asset_manifest(&self) -> Value {
        json!({
            "version": ASSEMBLY_VERSION,
            "files": {},
            "dockerImages": {
                self.image.hash(): {
                    "source": { "directory": self.image.directory().to_string_lossy() },
                    "destinations": {
                        ASSET_DESTINATION: {
                            "repositoryName": CONTAINER_ASSETS_REPOSITORY,
                            "imageTag": self.image.image_tag()
                        }
                    }
                }
            }
        })
    }

    /// Write the template and both manifests into `out_dir`, replacing old files.
    pub fn write(&self, out_dir: &Path) -> Result<Vec<PathBuf>, AssemblyError> {
        create_dir_all(out_dir).map_err(|e| AssemblyError::WriteAssembly(out_dir.into(), e))?;

        let template_file = self.template_file();
        let assets_file = self.assets_file();
        let files = [
            (to_json(&self.template, &template_file)?, template_file),
            (to_json(&self.asset_manifest(), &assets_file)?, assets_file),
            (to_json(&self.manifest(), MANIFEST_FILE)?, MANIFEST_FILE.to_string()),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (contents, name) in files {
            let path = out_dir.join(name);
            debug!(path = ?path, "writing cloud assembly file");
            write(&path, contents).map_err(|e| AssemblyError::WriteAssembly(path.clone(), e))?;
            written.push(path);
        }

        info!(stack = %self.stack_name, out_dir = ?out_dir, "cloud assembly written");
        Ok(written)
    }
}

fn to_json<T: Serialize>(value: &T, name: &str) -> Result<String, AssemblyError> {
    serde_json::to_string_pretty(value).map_err(|e| AssemblyError::Serialize(name.into(), e))
}
