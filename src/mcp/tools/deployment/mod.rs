// Bicep deployment tools
pub mod create_resource;
pub mod deploy_bicep_resource;
pub mod get_bicep_requirements;

pub use create_resource::{CreateResourceArgs, create_resource};
pub use deploy_bicep_resource::{DeployBicepResourceArgs, deploy_bicep_resource};
pub use get_bicep_requirements::{GetBicepRequirementsArgs, get_bicep_requirements};
