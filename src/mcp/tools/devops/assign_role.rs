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
pub struct AssignRoleArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    /// Project group, e.g. 'Contributors', 'Readers', 'Project Administrators'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub role_name: Option<String>,
    /// Object ID of the user, group or service principal
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub principal_id: Option<String>,
}

#[mcp_tool(
    name = "ado_assign_role",
    description = "Add a principal to an Azure DevOps project security group"
)]
pub async fn assign_role(
    client: &OpsClient,
    args: AssignRoleArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_assign_role(project_name={:?}, role_name={:?})",
        args.project_name,
        args.role_name
    );
    text_result(
        devops::assign_role(
            client,
            args.organization.as_deref(),
            args.project_name.as_deref(),
            args.role_name.as_deref(),
            args.principal_id.as_deref(),
        )
        .await,
    )
}
