use crate::azure::{
    client::OpsClient,
    resources::{self, TagUpdate},
};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct UpdateTagsArgs {
    /// Full resource ID (alternative to resource_name + resource_group)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_group: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_type: Option<String>,
    /// Tags as 'key1=value1,key2=value2'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub tags: Option<String>,
    /// 'merge' (default) keeps other tags, 'replace' overwrites them
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub operation: Option<String>,
}

#[mcp_tool(
    name = "azure_update_tags",
    description = "Add, update or replace tags on an Azure resource"
)]
pub async fn update_tags(
    client: &OpsClient,
    args: UpdateTagsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_update_tags(resource_id={:?}, resource_name={:?}, operation={:?})",
        args.resource_id,
        args.resource_name,
        args.operation
    );
    let update = TagUpdate {
        resource_id: args.resource_id.as_deref(),
        resource_name: args.resource_name.as_deref(),
        resource_group: args.resource_group.as_deref(),
        resource_type: args.resource_type.as_deref(),
        tags: args.tags.as_deref(),
        operation: args.operation.as_deref(),
    };
    text_result(resources::update_tags(client, update).await)
}
