// Azure DevOps project, repository and pipeline tools
pub mod assign_role;
pub mod create_branch;
pub mod create_pipeline;
pub mod create_project;
pub mod create_repo;
pub mod deploy_custom_yaml;
pub mod deploy_pipeline_yaml;
pub mod list_projects;
pub mod list_repos;

pub use assign_role::{AssignRoleArgs, assign_role};
pub use create_branch::{CreateBranchArgs, create_branch};
pub use create_pipeline::{CreatePipelineArgs, create_pipeline};
pub use create_project::{CreateProjectArgs, create_project};
pub use create_repo::{CreateRepoArgs, create_repo};
pub use deploy_custom_yaml::{DeployCustomYamlArgs, deploy_custom_yaml};
pub use deploy_pipeline_yaml::{DeployPipelineYamlArgs, deploy_pipeline_yaml};
pub use list_projects::{ListProjectsArgs, list_projects};
pub use list_repos::{ListReposArgs, list_repos};
