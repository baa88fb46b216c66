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
pub struct CreateManagedPrivateEndpointArgs {
    /// Fabric workspace ID (GUID)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub endpoint_name: Option<String>,
    /// Full Azure resource ID of the target
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub target_resource_id: Option<String>,
    /// Private link sub-resource, e.g. 'blob', 'dfs', 'vault', 'sqlServer'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub group_id: Option<String>,
}

#[mcp_tool(
    name = "fabric_create_managed_private_endpoint",
    description = "Create a managed private endpoint from a Fabric workspace to an Azure resource"
)]
pub async fn create_managed_private_endpoint(
    client: &OpsClient,
    args: CreateManagedPrivateEndpointArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_create_managed_private_endpoint(workspace_id={:?}, endpoint_name={:?}, group_id={:?})",
        args.workspace_id,
        args.endpoint_name,
        args.group_id
    );
    text_result(
        fabric::create_managed_private_endpoint(
            client,
            args.workspace_id.as_deref(),
            args.endpoint_name.as_deref(),
            args.target_resource_id.as_deref(),
            args.group_id.as_deref(),
        )
        .await,
    )
}
