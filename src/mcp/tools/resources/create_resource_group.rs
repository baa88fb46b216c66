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
pub struct CreateResourceGroupArgs {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_group_name: Option<String>,
    /// Azure region, e.g. 'eastus'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub region: Option<String>,
    /// Project name, applied as a tag
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
}

#[mcp_tool(
    name = "azure_create_resource_group",
    description = "Create an Azure resource group tagged with its project"
)]
pub async fn create_resource_group(
    client: &OpsClient,
    args: CreateResourceGroupArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_create_resource_group(resource_group_name={:?}, region={:?})",
        args.resource_group_name,
        args.region
    );
    text_result(
        resources::create_resource_group(
            client,
            args.resource_group_name.as_deref(),
            args.region.as_deref(),
            args.project_name.as_deref(),
        )
        .await,
    )
}
