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
pub struct ListManagedPrivateEndpointsArgs {
    /// Fabric workspace ID (GUID)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_id: Option<String>,
}

#[mcp_tool(
    name = "fabric_list_managed_private_endpoints",
    description = "List the managed private endpoints of a Fabric workspace"
)]
pub async fn list_managed_private_endpoints(
    client: &OpsClient,
    args: ListManagedPrivateEndpointsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_list_managed_private_endpoints(workspace_id={:?})",
        args.workspace_id
    );
    text_result(fabric::list_managed_private_endpoints(client, args.workspace_id.as_deref()).await)
}
