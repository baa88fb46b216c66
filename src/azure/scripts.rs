// Script file names under the configured scripts directory.

pub const LIST_AZURE_PERMISSIONS: &str = "list-azure-permissions.ps1";
pub const CREATE_RESOURCE_GROUP: &str = "create-resourcegroup.ps1";
pub const DEPLOY_BICEP: &str = "deploy-bicep.ps1";
pub const POST_DEPLOY_FUNCTION_APP: &str = "post-deploy-function-app.ps1";
pub const CHECK_RESOURCE: &str = "check-resource.ps1";
pub const ATTACH_NSP: &str = "attach-nsp.ps1";
pub const ATTACH_LOG_ANALYTICS: &str = "attach-log-analytics.ps1";
pub const UPDATE_TAGS: &str = "update-tags.ps1";
pub const GET_ACTIVITY_LOG: &str = "get-activity-log.ps1";

pub const GET_CURRENT_USER: &str = "get-current-user.ps1";
pub const LIST_SUBSCRIPTIONS: &str = "list-subscriptions.ps1";
pub const SET_SUBSCRIPTION: &str = "set-subscription.ps1";
pub const AZURE_LOGIN: &str = "azure-login.ps1";

pub const CREATE_DEVOPS_PROJECT: &str = "create-devops-project.ps1";
pub const CREATE_DEVOPS_REPO: &str = "create-devops-repo.ps1";
pub const LIST_DEVOPS_PROJECTS: &str = "list-devops-projects.ps1";
pub const LIST_DEVOPS_REPOS: &str = "list-devops-repos.ps1";
pub const CREATE_DEVOPS_BRANCH: &str = "create-devops-branch.ps1";
pub const DEPLOY_PIPELINE_YAML: &str = "deploy-pipeline-yaml.ps1";
pub const CREATE_DEVOPS_PIPELINE: &str = "create-devops-pipeline.ps1";
pub const ASSIGN_ADO_ROLE: &str = "assign-ado-role.ps1";

pub const LIST_FABRIC_PERMISSIONS: &str = "list-fabric-permissions.ps1";
pub const CREATE_FABRIC_MANAGED_PE: &str = "create-fabric-managed-pe.ps1";
pub const LIST_FABRIC_MANAGED_PE: &str = "list-fabric-managed-pe.ps1";
pub const CREATE_FABRIC_WORKSPACE: &str = "create-fabric-workspace.ps1";
pub const ATTACH_FABRIC_GIT: &str = "attach-fabric-git.ps1";
pub const ASSIGN_FABRIC_ROLE: &str = "assign-fabric-role.ps1";
