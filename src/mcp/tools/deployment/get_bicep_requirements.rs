use crate::azure::{client::OpsClient, deploy};
use crate::mcp::tools::support::{deserialize_non_empty_string, json_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetBicepRequirementsArgs {
    /// Resource type key, e.g. 'storage-account', 'key-vault', 'fabric-capacity'
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub resource_type: String,
}

#[mcp_tool(
    name = "azure_get_bicep_requirements",
    description = "Get the required and optional parameters, with defaults, of a resource type's Bicep template"
)]
pub async fn get_bicep_requirements(
    client: &OpsClient,
    args: GetBicepRequirementsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_get_bicep_requirements(resource_type={})",
        args.resource_type
    );
    json_result(deploy::bicep_requirements(client, &args.resource_type).await)
}
