use crate::azure::{
    client::OpsClient,
    resources::{self, ActivityLogQuery},
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
pub struct GetActivityLogArgs {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_group: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub resource_name: Option<String>,
    /// Days to look back (1-90). Omit to be offered the choices.
    #[serde(default)]
    pub days: Option<u32>,
    /// Maximum events returned (default 50)
    #[serde(default)]
    pub max_events: Option<u32>,
    /// Filter on operation name, e.g. 'delete'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub operation_type: Option<String>,
}

#[mcp_tool(
    name = "azure_get_activity_log",
    description = "Get Azure Activity Log events for auditing and troubleshooting"
)]
pub async fn get_activity_log(
    client: &OpsClient,
    args: GetActivityLogArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_get_activity_log(resource_group={:?}, days={:?}, max_events={:?})",
        args.resource_group,
        args.days,
        args.max_events
    );
    let query = ActivityLogQuery {
        resource_group: args.resource_group.as_deref(),
        resource_id: args.resource_id.as_deref(),
        resource_name: args.resource_name.as_deref(),
        days: args.days,
        max_events: args.max_events,
        operation_type: args.operation_type.as_deref(),
    };
    text_result(resources::get_activity_log(client, query).await)
}
