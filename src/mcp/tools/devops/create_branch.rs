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
pub struct CreateBranchArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    /// New branch name
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub branch_name: Option<String>,
    /// Branch to create from (default: main)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub base_branch: Option<String>,
}

#[mcp_tool(
    name = "ado_create_branch",
    description = "Create a branch in an Azure DevOps repository from a base branch"
)]
pub async fn create_branch(
    client: &OpsClient,
    args: CreateBranchArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_create_branch(repo_name={:?}, branch_name={:?})",
        args.repo_name,
        args.branch_name
    );
    text_result(
        devops::create_branch(
            client,
            args.organization.as_deref(),
            args.project_name.as_deref(),
            args.repo_name.as_deref(),
            args.branch_name.as_deref(),
            args.base_branch.as_deref(),
        )
        .await,
    )
}
