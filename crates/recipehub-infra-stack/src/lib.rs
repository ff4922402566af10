//! Declaration of the RecipeHub backend stack and its synthesis into a
//! CloudFormation cloud assembly.
pub mod assembly;
pub mod asset;
pub mod error;
pub mod function;
pub mod lambda;
pub mod stack;
pub mod template;

pub use assembly::CloudAssembly;
pub use asset::DockerImageAsset;
pub use error::{AssemblyError, StackError};
pub use stack::{RecipehubStackProps, STACK_NAME, Stack, StackEnvironment};
pub use template::Template;
