use crate::azure::{client::OpsClient, resources};
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
    name = "azure_list_permissions",
    description = "List active Azure RBAC role assignments for a user across resources and subscriptions"
)]
pub async fn list_permissions(
    client: &OpsClient,
    args: ListPermissionsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_list_permissions(user_principal_name={:?})",
        args.user_principal_name
    );
    text_result(resources::list_permissions(client, args.user_principal_name.as_deref()).await)
}
