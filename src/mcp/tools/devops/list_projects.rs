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
pub struct ListProjectsArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
}

#[mcp_tool(
    name = "ado_list_projects",
    description = "List the projects of an Azure DevOps organization"
)]
pub async fn list_projects(
    client: &OpsClient,
    args: ListProjectsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_list_projects(organization={:?})",
        args.organization
    );
    text_result(devops::list_projects(client, args.organization.as_deref()).await)
}
