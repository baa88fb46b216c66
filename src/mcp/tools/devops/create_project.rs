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
pub struct CreateProjectArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    /// Project description
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub description: Option<String>,
}

#[mcp_tool(
    name = "ado_create_project",
    description = "Create an Azure DevOps project with its initial repository"
)]
pub async fn create_project(
    client: &OpsClient,
    args: CreateProjectArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_create_project(organization={:?}, project_name={:?})",
        args.organization,
        args.project_name
    );
    text_result(
        devops::create_project(
            client,
            args.organization.as_deref(),
            args.project_name.as_deref(),
            args.repo_name.as_deref(),
            args.description.as_deref(),
        )
        .await,
    )
}
