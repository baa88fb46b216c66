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
pub struct CreateWorkspaceArgs {
    /// Full resource ID of the Fabric capacity
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub capacity_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub description: Option<String>,
}

#[mcp_tool(
    name = "fabric_create_workspace",
    description = "Create a Fabric workspace on a capacity"
)]
pub async fn create_workspace(
    client: &OpsClient,
    args: CreateWorkspaceArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: fabric_create_workspace(capacity_id={:?}, workspace_name={:?})",
        args.capacity_id,
        args.workspace_name
    );
    text_result(
        fabric::create_workspace(
            client,
            args.capacity_id.as_deref(),
            args.workspace_name.as_deref(),
            args.description.as_deref(),
        )
        .await,
    )
}
