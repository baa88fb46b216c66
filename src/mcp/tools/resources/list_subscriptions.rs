use crate::azure::{account, client::OpsClient};
use crate::mcp::tools::support::text_result;
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListSubscriptionsArgs {}

#[mcp_tool(
    name = "azure_list_subscriptions",
    description = "List all Azure subscriptions the signed-in user can access"
)]
pub async fn list_subscriptions(
    client: &OpsClient,
    _args: ListSubscriptionsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azure_list_subscriptions");
    text_result(account::list_subscriptions(client).await)
}
