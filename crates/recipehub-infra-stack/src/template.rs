//! CloudFormation rendering of a [`Stack`].
use serde::Serialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::{
    asset::DockerImageAsset,
    error::StackError,
    function::{DockerImageFunction, FunctionUrl},
    lambda::FunctionUrlAuthType,
    stack::{OutputValue, Stack},
};

pub const ROLE_TYPE: &str = "AWS::IAM::Role";
pub const FUNCTION_TYPE: &str = "AWS::Lambda::Function";
pub const FUNCTION_URL_TYPE: &str = "AWS::Lambda::Url";
pub const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";

const SERVICE_ROLE_ID: &str = "ServiceRole";
const INVOKE_URL_PERMISSION_ID: &str = "invoke-function-url";
const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    fn new(kind: &str, properties: Value) -> Self {
        Resource {
            kind: kind.into(),
            properties,
            depends_on: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

impl Template {
    pub fn resources_of_type<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.kind == kind)
            .map(|(id, r)| (id.as_str(), r))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Logical id for the construct at `path`, where the first element is the stack name.
///
/// The readable part drops the stack name and every non alphanumeric
/// character, the suffix is the first 8 hex digits of the path's SHA-256.
pub fn logical_id(path: &[&str]) -> String {
    let human: String = path
        .iter()
        .skip(1)
        .flat_map(|p| p.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect();

    let digest = format!("{:X}", Sha256::digest(path.join("/").as_bytes()));
    format!("{human}{}", &digest[..8])
}

fn get_att(id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id, attribute] })
}

impl Stack {
    /// Render the stack as a CloudFormation template, with the
    /// function image taken from `image`.
    pub fn template(&self, image: &DockerImageAsset) -> Result<Template, StackError> {
        let mut template = Template::default();
        let mut url_ids = BTreeMap::new();

        let function = self.function();
        let function_path = [self.name(), function.id()];
        let function_id = logical_id(&function_path);
        let role_id = logical_id(&[self.name(), function.id(), SERVICE_ROLE_ID]);

        template
            .resources
            .insert(role_id.clone(), execution_role());

        let mut function_resource = function_resource(function, &role_id, image);
        function_resource.depends_on.push(role_id);
        template
            .resources
            .insert(function_id.clone(), function_resource);

        if let Some(url) = function.url() {
            let url_id = logical_id(&[self.name(), function.id(), url.id()]);
            template
                .resources
                .insert(url_id.clone(), url_resource(url, &function_id));

            if url.auth_type() == FunctionUrlAuthType::None {
                let permission_id =
                    logical_id(&[self.name(), function.id(), INVOKE_URL_PERMISSION_ID]);
                template
                    .resources
                    .insert(permission_id, public_url_permission(&function_id));
            }

            url_ids.insert(function.id().to_string(), url_id);
        }

        for output in self.outputs() {
            let value = match &output.value {
                OutputValue::FunctionUrl { function_id } => {
                    let url_id = url_ids
                        .get(function_id)
                        .ok_or_else(|| StackError::UnresolvedOutput(output.id.clone()))?;
                    get_att(url_id, "FunctionUrl")
                }
            };

            template.outputs.insert(
                output.id.clone(),
                Output {
                    description: output.description.clone(),
                    value,
                    export: output
                        .export_name
                        .as_ref()
                        .map(|name| Export { name: name.clone() }),
                },
            );
        }

        Ok(template)
    }
}

fn execution_role() -> Resource {
    Resource::new(
        ROLE_TYPE,
        json!({
            "AssumeRolePolicyDocument": {
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" }
                }],
                "Version": "2012-10-17"
            },
            "ManagedPolicyArns": [{
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    format!(":iam::aws:policy/{BASIC_EXECUTION_POLICY}")
                ]]
            }]
        }),
    )
}

fn function_resource(
    function: &DockerImageFunction,
    role_id: &str,
    image: &DockerImageAsset,
) -> Resource {
    let mut properties = json!({
        "Architectures": [function.architecture()],
        "Code": { "ImageUri": { "Fn::Sub": image.image_uri() } },
        "MemorySize": function.memory(),
        "PackageType": "Image",
        "Role": get_att(role_id, "Arn"),
        "Timeout": function.timeout(),
    });

    if !function.environment().is_empty() {
        properties["Environment"] = json!({ "Variables": function.environment() });
    }

    if let Some(name) = function.function_name() {
        properties["FunctionName"] = json!(name);
    }

    Resource::new(FUNCTION_TYPE, properties)
}

fn url_resource(url: &FunctionUrl, function_id: &str) -> Resource {
    let mut properties = json!({
        "AuthType": url.auth_type(),
        "TargetFunctionArn": get_att(function_id, "Arn"),
    });

    if let Some(cors) = url.cors() {
        properties["Cors"] = json!({
            "AllowCredentials": cors.allow_credentials,
            "AllowHeaders": cors.allowed_headers,
            "AllowMethods": cors.allowed_methods,
            "AllowOrigins": cors.allowed_origins,
        });
    }

    Resource::new(FUNCTION_URL_TYPE, properties)
}

// Public urls need an explicit grant even though they skip authentication.
fn public_url_permission(function_id: &str) -> Resource {
    Resource::new(
        PERMISSION_TYPE,
        json!({
            "Action": "lambda:InvokeFunctionUrl",
            "FunctionName": get_att(function_id, "Arn"),
            "FunctionUrlAuthType": FunctionUrlAuthType::None,
            "Principal": "*",
        }),
    )
}
