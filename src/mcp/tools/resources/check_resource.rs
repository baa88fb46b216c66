use crate::azure::{client::OpsClient, lookup};
use crate::mcp::tools::support::{deserialize_non_empty_string, json_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct CheckResourceArgs {
    /// Resource group to look in
    #[serde(default)]
    pub resource_group: String,
    /// Resource type key, e.g. 'nsp', 'log-analytics', 'key-vault'
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub resource_type: String,
}

#[mcp_tool(
    name = "azure_check_resource",
    description = "Check which resources of a type exist in a resource group"
)]
pub async fn check_resource(
    client: &OpsClient,
    args: CheckResourceArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_check_resource(resource_group={}, resource_type={})",
        args.resource_group,
        args.resource_type
    );
    let found = lookup::check_resource(client, &args.resource_group, &args.resource_type).await;
    json_result(found.map(|l| l.to_check_result()))
}
