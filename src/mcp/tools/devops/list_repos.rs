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
pub struct ListReposArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
}

#[mcp_tool(
    name = "ado_list_repos",
    description = "List the Git repositories of an Azure DevOps project"
)]
pub async fn list_repos(
    client: &OpsClient,
    args: ListReposArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_list_repos(organization={:?}, project_name={:?})",
        args.organization,
        args.project_name
    );
    text_result(
        devops::list_repos(
            client,
            args.organization.as_deref(),
            args.project_name.as_deref(),
        )
        .await,
    )
}
