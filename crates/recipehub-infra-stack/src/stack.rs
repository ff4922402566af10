use std::{collections::BTreeMap, fmt, path::PathBuf};
use tracing::debug;

use crate::{
    error::StackError,
    function::{
        DockerImageCode, DockerImageFunction, DockerImageFunctionProps, FunctionUrlCors,
        FunctionUrlOptions,
    },
    lambda::{Architecture, FunctionUrlAuthType, Memory, Timeout},
};

pub const STACK_NAME: &str = "RecipehubBackendStack";
pub const FUNCTION_ID: &str = "RecipehubBackendFunction";
pub const FUNCTION_NAME: &str = "recipehub-backend";
pub const API_URL_OUTPUT_ID: &str = "ApiUrl";
pub const API_URL_EXPORT_NAME: &str = "RecipehubApiUrl";
const API_URL_DESCRIPTION: &str = "RecipeHub Backend API URL";

const FUNCTION_MEMORY_MB: u32 = 512;
const FUNCTION_TIMEOUT_SECS: u32 = 30;

/// Account and region the stack is deployed to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackEnvironment {
    pub account: Option<String>,
    pub region: String,
}

impl fmt::Display for StackEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region
        )
    }
}

/// Everything the backend stack needs to be declared.
#[derive(Clone)]
pub struct RecipehubStackProps {
    pub env: StackEnvironment,
    /// Directory with the backend's Dockerfile.
    pub build_context: PathBuf,
    pub database_url: String,
    pub secret_key: String,
    pub openai_api_key: String,
}

impl fmt::Debug for RecipehubStackProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipehubStackProps")
            .field("env", &self.env)
            .field("build_context", &self.build_context)
            .finish_non_exhaustive()
    }
}

/// Value published by a stack once it's deployed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CfnOutput {
    pub id: String,
    pub value: OutputValue,
    pub description: Option<String>,
    pub export_name: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputValue {
    /// The url assigned to a function's url, resolved at deploy time.
    FunctionUrl { function_id: String },
}

/// The backend stack: one container function, its public url and the url output.
#[derive(Clone, Debug)]
pub struct Stack {
    name: String,
    env: StackEnvironment,
    function: DockerImageFunction,
    outputs: Vec<CfnOutput>,
}

impl Stack {
    /// Declare the backend stack.
    ///
    /// Every required property is checked before anything is declared,
    /// so a failure never leaves a half built stack behind.
    pub fn recipehub(
        name: impl Into<String>,
        props: RecipehubStackProps,
    ) -> Result<Stack, StackError> {
        required(&props.database_url, "database_url")?;
        required(&props.secret_key, "secret_key")?;
        required(&props.openai_api_key, "openai_api_key")?;
        required(&props.env.region, "region")?;

        let name = name.into();
        debug!(stack = %name, ?props, "declaring stack");

        let environment = BTreeMap::from([
            ("DATABASE_URL".to_string(), props.database_url),
            ("SECRET_KEY".to_string(), props.secret_key),
            ("OPENAI_API_KEY".to_string(), props.openai_api_key),
        ]);

        let mut function = DockerImageFunction::new(
            FUNCTION_ID,
            DockerImageFunctionProps {
                function_name: Some(FUNCTION_NAME.into()),
                code: DockerImageCode::from_image_asset(props.build_context),
                memory: Memory::new(FUNCTION_MEMORY_MB)?,
                timeout: Timeout::new(FUNCTION_TIMEOUT_SECS)?,
                environment,
                architecture: Architecture::X86_64,
            },
        );

        function.add_function_url(FunctionUrlOptions {
            auth_type: FunctionUrlAuthType::None,
            cors: Some(FunctionUrlCors::permissive()),
        })?;

        let api_url = CfnOutput {
            id: API_URL_OUTPUT_ID.into(),
            value: OutputValue::FunctionUrl {
                function_id: function.id().to_string(),
            },
            description: Some(API_URL_DESCRIPTION.into()),
            export_name: Some(API_URL_EXPORT_NAME.into()),
        };

        Ok(Stack {
            name,
            env: props.env,
            function,
            outputs: vec![api_url],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &StackEnvironment {
        &self.env
    }

    pub fn function(&self) -> &DockerImageFunction {
        &self.function
    }

    pub fn outputs(&self) -> &[CfnOutput] {
        &self.outputs
    }

    pub fn api_url(&self) -> Option<&CfnOutput> {
        self.outputs.iter().find(|o| o.id == API_URL_OUTPUT_ID)
    }
}

fn required(value: &str, name: &'static str) -> Result<(), StackError> {
    if value.trim().is_empty() {
        return Err(StackError::EmptyProperty(name));
    }
    Ok(())
}
