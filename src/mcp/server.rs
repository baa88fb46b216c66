use crate::azure::client::OpsClient;
use crate::mcp::tools::{compliance, deployment, devops, fabric, general, resources};
use rmcp::{
    ErrorData as McpError,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

const INSTRUCTIONS: &str = "Azure operations agent. Deploys Azure resources from Bicep templates, \
keeps them compliant (Network Security Perimeter membership, diagnostic settings to Log Analytics), \
queries resources, and manages Azure DevOps projects and pipelines and Microsoft Fabric workspaces. \
Call show_agent_instructions for the full guide.";

#[derive(Clone)]
pub struct AzureOpsServer {
    client: Arc<OpsClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AzureOpsServer {
    pub fn new(client: OpsClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Log in to Azure. With multiple subscriptions, returns the list; call again with selected_subscription_id"
    )]
    async fn azure_login(
        &self,
        args: Parameters<general::AzureLoginArgs>,
    ) -> Result<CallToolResult, McpError> {
        general::azure_login(&self.client, args.0).await
    }

    #[tool(description = "Get the current Azure subscription, tenant and signed-in user email")]
    async fn get_current_user(&self) -> Result<CallToolResult, McpError> {
        general::get_current_user(&self.client, general::GetCurrentUserArgs {}).await
    }

    #[tool(
        description = "Show the agent instructions: capabilities, supported resources and operational guidelines"
    )]
    async fn show_agent_instructions(&self) -> Result<CallToolResult, McpError> {
        general::show_agent_instructions(&self.client, general::ShowAgentInstructionsArgs {}).await
    }

    #[tool(
        description = "Assign an Azure RBAC role to a service principal or managed identity. Users and groups must use PIM"
    )]
    async fn azure_assign_role(
        &self,
        args: Parameters<resources::AssignRoleArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::assign_role(&self.client, args.0).await
    }

    #[tool(description = "Check which resources of a type exist in a resource group")]
    async fn azure_check_resource(
        &self,
        args: Parameters<resources::CheckResourceArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::check_resource(&self.client, args.0).await
    }

    #[tool(description = "Create an Azure resource group tagged with its project")]
    async fn azure_create_resource_group(
        &self,
        args: Parameters<resources::CreateResourceGroupArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::create_resource_group(&self.client, args.0).await
    }

    #[tool(description = "Get Azure Activity Log events for auditing and troubleshooting")]
    async fn azure_get_activity_log(
        &self,
        args: Parameters<resources::GetActivityLogArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::get_activity_log(&self.client, args.0).await
    }

    #[tool(
        description = "Query Azure resource groups and resources: list, get, find by name, check a type in a group, or run a Resource Graph query"
    )]
    async fn azure_get_resource_info(
        &self,
        args: Parameters<resources::GetResourceInfoArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::get_resource_info(&self.client, args.0).await
    }

    #[tool(
        description = "List active Azure RBAC role assignments for a user across resources and subscriptions"
    )]
    async fn azure_list_permissions(
        &self,
        args: Parameters<resources::ListPermissionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::list_permissions(&self.client, args.0).await
    }

    #[tool(description = "List all Azure subscriptions the signed-in user can access")]
    async fn azure_list_subscriptions(&self) -> Result<CallToolResult, McpError> {
        resources::list_subscriptions(&self.client, resources::ListSubscriptionsArgs {}).await
    }

    #[tool(description = "Set the active Azure subscription by ID or name")]
    async fn azure_set_subscription(
        &self,
        args: Parameters<resources::SetSubscriptionArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::set_subscription(&self.client, args.0).await
    }

    #[tool(description = "Add, update or replace tags on an Azure resource")]
    async fn azure_update_tags(
        &self,
        args: Parameters<resources::UpdateTagsArgs>,
    ) -> Result<CallToolResult, McpError> {
        resources::update_tags(&self.client, args.0).await
    }

    #[tool(
        description = "Send a resource's diagnostic logs to the resource group's Log Analytics workspace, creating the workspace if needed"
    )]
    async fn azure_attach_diagnostic_settings(
        &self,
        args: Parameters<compliance::AttachDiagnosticSettingsArgs>,
    ) -> Result<CallToolResult, McpError> {
        compliance::attach_diagnostic_settings(&self.client, args.0).await
    }

    #[tool(
        description = "Attach a resource to the resource group's Network Security Perimeter, creating the perimeter if needed"
    )]
    async fn azure_attach_to_nsp(
        &self,
        args: Parameters<compliance::AttachToNspArgs>,
    ) -> Result<CallToolResult, McpError> {
        compliance::attach_to_nsp(&self.client, args.0).await
    }

    #[tool(
        description = "Answer a compliance prompt from a deployment: run or skip the NSP attachment or Log Analytics configuration it names"
    )]
    async fn azure_confirm_compliance(
        &self,
        args: Parameters<compliance::ConfirmComplianceArgs>,
    ) -> Result<CallToolResult, McpError> {
        compliance::confirm_compliance(&self.client, args.0).await
    }

    #[tool(
        description = "Create an Azure resource interactively: asks for the resource group and any missing template parameters, then deploys"
    )]
    async fn azure_create_resource(
        &self,
        args: Parameters<deployment::CreateResourceArgs>,
    ) -> Result<CallToolResult, McpError> {
        deployment::create_resource(&self.client, args.0).await
    }

    #[tool(
        description = "Deploy a resource from its Bicep template with fully specified parameters. Call azure_get_bicep_requirements first"
    )]
    async fn azure_deploy_bicep_resource(
        &self,
        args: Parameters<deployment::DeployBicepResourceArgs>,
    ) -> Result<CallToolResult, McpError> {
        deployment::deploy_bicep_resource(&self.client, args.0).await
    }

    #[tool(
        description = "Get the required and optional parameters, with defaults, of a resource type's Bicep template"
    )]
    async fn azure_get_bicep_requirements(
        &self,
        args: Parameters<deployment::GetBicepRequirementsArgs>,
    ) -> Result<CallToolResult, McpError> {
        deployment::get_bicep_requirements(&self.client, args.0).await
    }

    #[tool(description = "Add a principal to an Azure DevOps project security group")]
    async fn ado_assign_role(
        &self,
        args: Parameters<devops::AssignRoleArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::assign_role(&self.client, args.0).await
    }

    #[tool(description = "Create a branch in an Azure DevOps repository from a base branch")]
    async fn ado_create_branch(
        &self,
        args: Parameters<devops::CreateBranchArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::create_branch(&self.client, args.0).await
    }

    #[tool(description = "Create an Azure DevOps pipeline from a YAML file in a repository")]
    async fn ado_create_pipeline(
        &self,
        args: Parameters<devops::CreatePipelineArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::create_pipeline(&self.client, args.0).await
    }

    #[tool(description = "Create an Azure DevOps project with its initial repository")]
    async fn ado_create_project(
        &self,
        args: Parameters<devops::CreateProjectArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::create_project(&self.client, args.0).await
    }

    #[tool(description = "Create a Git repository in an existing Azure DevOps project")]
    async fn ado_create_repo(
        &self,
        args: Parameters<devops::CreateRepoArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::create_repo(&self.client, args.0).await
    }

    #[tool(
        description = "Commit caller-supplied YAML to a folder of an Azure DevOps repository branch"
    )]
    async fn ado_deploy_custom_yaml(
        &self,
        args: Parameters<devops::DeployCustomYamlArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::deploy_custom_yaml(&self.client, args.0).await
    }

    #[tool(
        description = "Commit a pipeline YAML template (credscan, credscan-1es) or custom YAML to an Azure DevOps repository"
    )]
    async fn ado_deploy_pipeline_yaml(
        &self,
        args: Parameters<devops::DeployPipelineYamlArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::deploy_pipeline_yaml(&self.client, args.0).await
    }

    #[tool(description = "List the projects of an Azure DevOps organization")]
    async fn ado_list_projects(
        &self,
        args: Parameters<devops::ListProjectsArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::list_projects(&self.client, args.0).await
    }

    #[tool(description = "List the Git repositories of an Azure DevOps project")]
    async fn ado_list_repos(
        &self,
        args: Parameters<devops::ListReposArgs>,
    ) -> Result<CallToolResult, McpError> {
        devops::list_repos(&self.client, args.0).await
    }

    #[tool(description = "Assign a Fabric workspace role to a user, group or service principal")]
    async fn fabric_assign_role(
        &self,
        args: Parameters<fabric::AssignRoleArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::assign_role(&self.client, args.0).await
    }

    #[tool(description = "Connect a Fabric workspace to an Azure DevOps Git repository branch")]
    async fn fabric_attach_workspace_to_git(
        &self,
        args: Parameters<fabric::AttachWorkspaceToGitArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::attach_workspace_to_git(&self.client, args.0).await
    }

    #[tool(
        description = "Create a managed private endpoint from a Fabric workspace to an Azure resource"
    )]
    async fn fabric_create_managed_private_endpoint(
        &self,
        args: Parameters<fabric::CreateManagedPrivateEndpointArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::create_managed_private_endpoint(&self.client, args.0).await
    }

    #[tool(description = "Create a Fabric workspace on a capacity")]
    async fn fabric_create_workspace(
        &self,
        args: Parameters<fabric::CreateWorkspaceArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::create_workspace(&self.client, args.0).await
    }

    #[tool(description = "List the managed private endpoints of a Fabric workspace")]
    async fn fabric_list_managed_private_endpoints(
        &self,
        args: Parameters<fabric::ListManagedPrivateEndpointsArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::list_managed_private_endpoints(&self.client, args.0).await
    }

    #[tool(description = "List Microsoft Fabric workspace role assignments for a user")]
    async fn fabric_list_permissions(
        &self,
        args: Parameters<fabric::ListPermissionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        fabric::list_permissions(&self.client, args.0).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AzureOpsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "azure-operations-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
