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
pub struct ListPermissionsArgs {
    /// User principal name (email); defaults to the signed-in user
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub user_principal_name: Option<String>,
}

#[mcp_tool(
    name = "fabric_list_permissions",
    description = "List Microsoft Fabric workspace role assignments for a user"
)]
pub async fn list_permissions(
    client: &OpsClient,
    args: ListPermissionsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_list_permissions(user_principal_name={:?})",
        args.user_principal_name
    );
    text_result(fabric::list_permissions(client, args.user_principal_name.as_deref()).await)
}
