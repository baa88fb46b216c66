use crate::azure::{client::OpsClient, fabric};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct AttachWorkspaceToGitArgs {
    /// Fabric workspace ID (GUID)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_id: Option<String>,
    /// Azure DevOps organization name or URL
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub branch_name: Option<String>,
    /// Folder in the repository (default: /)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub directory_name: Option<String>,
}

#[mcp_tool(
    name = "fabric_attach_workspace_to_git",
    description = "Connect a Fabric workspace to an Azure DevOps Git repository branch"
)]
pub async fn attach_workspace_to_git(
    client: &OpsClient,
    args: AttachWorkspaceToGitArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_attach_workspace_to_git(workspace_id={:?}, repo_name={:?}, branch_name={:?})",
        args.workspace_id,
        args.repo_name,
        args.branch_name
    );
    text_result(
        fabric::attach_workspace_to_git(
            client,
            args.workspace_id.as_deref(),
            args.organization.as_deref(),
            args.project_name.as_deref(),
            args.repo_name.as_deref(),
            args.branch_name.as_deref(),
            args.directory_name.as_deref(),
        )
        .await,
    )
}
