use crate::azure::{
    client::OpsClient,
    resources::{self, ResourceQuery},
};
use crate::mcp::tools::support::{deserialize_blank_as_none, deserialize_non_empty_string, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetResourceInfoArgs {
    /// One of: list_rgs, list_resources, get_resource, find_resource, check_type_in_rg, get_rg_info, custom
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub query_type: String,
    /// Resource name (get_resource, find_resource)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_name: Option<String>,
    /// Resource group (filter, or required by check_type_in_rg and get_rg_info)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_group: Option<String>,
    /// Resource type key, e.g. 'key-vault', 'storage-account'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_type: Option<String>,
    /// Azure Resource Graph query (custom)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub custom_query: Option<String>,
}

#[mcp_tool(
    name = "azure_get_resource_info",
    description = "Query Azure resource groups and resources: list, get, find by name, check a type in a group, or run a Resource Graph query"
)]
pub async fn get_resource_info(
    client: &OpsClient,
    args: GetResourceInfoArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_get_resource_info(query_type={}, resource_name={:?}, resource_group={:?})",
        args.query_type,
        args.resource_name,
        args.resource_group
    );
    let query = ResourceQuery {
        query_type: &args.query_type,
        resource_name: args.resource_name.as_deref(),
        resource_group: args.resource_group.as_deref(),
        resource_type: args.resource_type.as_deref(),
        custom_query: args.custom_query.as_deref(),
    };
    text_result(resources::query_resources(client, query).await)
}
