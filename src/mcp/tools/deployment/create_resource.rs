use crate::azure::{client::OpsClient, deploy};
use crate::mcp::tools::support::{deserialize_blank_as_none, deserialize_non_empty_string, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct CreateResourceArgs {
    /// Resource type key, e.g. 'storage-account', 'key-vault'
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub resource_type: String,
    /// Target resource group; asked for when missing
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_group: Option<String>,
    /// Template parameters as a JSON object string; missing required ones are listed
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub parameters: Option<String>,
}

#[mcp_tool(
    name = "azure_create_resource",
    description = "Create an Azure resource interactively: asks for the resource group and any missing template parameters, then deploys"
)]
pub async fn create_resource(
    client: &OpsClient,
    args: CreateResourceArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_create_resource(resource_type={}, resource_group={:?})",
        args.resource_type,
        args.resource_group
    );
    text_result(
        deploy::create_resource(
            client,
            &args.resource_type,
            args.resource_group.as_deref(),
            args.parameters.as_deref(),
        )
        .await,
    )
}
