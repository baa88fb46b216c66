use crate::azure::{client::OpsClient, devops};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct CreateRepoArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
}

#[mcp_tool(
    name = "ado_create_repo",
    description = "Create a Git repository in an existing Azure DevOps project"
)]
pub async fn create_repo(
    client: &OpsClient,
    args: CreateRepoArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_create_repo(organization={:?}, project_name={:?}, repo_name={:?})",
        args.organization,
        args.project_name,
        args.repo_name
    );
    text_result(
        devops::create_repo(
            client,
            args.organization.as_deref(),
            args.project_name.as_deref(),
            args.repo_name.as_deref(),
        )
        .await,
    )
}
