use crate::azure::{account, client::OpsClient};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct AzureLoginArgs {
    /// Subscription to make default after login, when several are available
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub selected_subscription_id: Option<String>,
}

#[mcp_tool(
    name = "azure_login",
    description = "Log in to Azure. With multiple subscriptions, returns the list; call again with selected_subscription_id"
)]
pub async fn azure_login(
    client: &OpsClient,
    args: AzureLoginArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_login(selected_subscription_id={:?})",
        args.selected_subscription_id
    );
    text_result(account::azure_login(client, args.selected_subscription_id.as_deref()).await)
}
