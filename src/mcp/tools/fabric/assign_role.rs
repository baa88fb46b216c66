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
pub struct AssignRoleArgs {
    /// Workspace name or ID
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_identifier: Option<String>,
    /// Admin, Contributor, Member or Viewer
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub role_name: Option<String>,
    /// Object ID of the user, group, service principal or managed identity
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub principal_id: Option<String>,
    /// User, Group, ServicePrincipal or ServicePrincipalProfile
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub principal_type: Option<String>,
}

#[mcp_tool(
    name = "fabric_assign_role",
    description = "Assign a Fabric workspace role to a user, group or service principal"
)]
pub async fn assign_role(
    client: &OpsClient,
    args: AssignRoleArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_assign_role(workspace_identifier={:?}, role_name={:?}, principal_type={:?})",
        args.workspace_identifier,
        args.role_name,
        args.principal_type
    );
    text_result(
        fabric::assign_role(
            client,
            args.workspace_identifier.as_deref(),
            args.role_name.as_deref(),
            args.principal_id.as_deref(),
            args.principal_type.as_deref(),
        )
        .await,
    )
}
