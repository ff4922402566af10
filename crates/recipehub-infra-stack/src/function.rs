use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    error::StackError,
    lambda::{Architecture, FunctionUrlAuthType, HttpMethod, Memory, Timeout},
};

/// Function code built from a directory that contains a Dockerfile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DockerImageCode {
    directory: PathBuf,
}

impl DockerImageCode {
    /// The directory is not inspected here, a missing or broken
    /// Dockerfile only shows up when the image is built.
    pub fn from_image_asset(directory: impl Into<PathBuf>) -> Self {
        DockerImageCode {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[derive(Clone, Debug)]
pub struct DockerImageFunctionProps {
    pub function_name: Option<String>,
    pub code: DockerImageCode,
    pub memory: Memory,
    pub timeout: Timeout,
    pub environment: BTreeMap<String, String>,
    pub architecture: Architecture,
}

/// A Lambda function that runs a container image.
#[derive(Clone, Debug)]
pub struct DockerImageFunction {
    id: String,
    props: DockerImageFunctionProps,
    url: Option<FunctionUrl>,
}

impl DockerImageFunction {
    pub fn new(id: impl Into<String>, props: DockerImageFunctionProps) -> Self {
        DockerImageFunction {
            id: id.into(),
            props,
            url: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn function_name(&self) -> Option<&str> {
        self.props.function_name.as_deref()
    }

    pub fn code(&self) -> &DockerImageCode {
        &self.props.code
    }

    pub fn memory(&self) -> Memory {
        self.props.memory
    }

    pub fn timeout(&self) -> Timeout {
        self.props.timeout
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.props.environment
    }

    pub fn architecture(&self) -> Architecture {
        self.props.architecture
    }

    pub fn url(&self) -> Option<&FunctionUrl> {
        self.url.as_ref()
    }

    /// Attach a function url. A function can only have one.
    pub fn add_function_url(
        &mut self,
        options: FunctionUrlOptions,
    ) -> Result<&FunctionUrl, StackError> {
        if self.url.is_some() {
            return Err(StackError::DuplicateFunctionUrl(self.id.clone()));
        }

        let url = self.url.insert(FunctionUrl {
            id: FUNCTION_URL_ID.into(),
            auth_type: options.auth_type,
            cors: options.cors,
        });
        Ok(&*url)
    }
}

const FUNCTION_URL_ID: &str = "FunctionUrl";

#[derive(Clone, Debug)]
pub struct FunctionUrlOptions {
    pub auth_type: FunctionUrlAuthType,
    pub cors: Option<FunctionUrlCors>,
}

/// Public HTTPS endpoint attached to a function.
#[derive(Clone, Debug)]
pub struct FunctionUrl {
    id: String,
    auth_type: FunctionUrlAuthType,
    cors: Option<FunctionUrlCors>,
}

impl FunctionUrl {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn auth_type(&self) -> FunctionUrlAuthType {
        self.auth_type
    }

    pub fn cors(&self) -> Option<&FunctionUrlCors> {
        self.cors.as_ref()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionUrlCors {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<HttpMethod>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl FunctionUrlCors {
    /// Any origin, any method, any header, credentials included.
    pub fn permissive() -> Self {
        FunctionUrlCors {
            allowed_origins: vec!["*".into()],
            allowed_methods: vec![HttpMethod::All],
            allowed_headers: vec!["*".into()],
            allow_credentials: true,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}
