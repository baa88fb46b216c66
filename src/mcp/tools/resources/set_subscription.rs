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
pub struct SetSubscriptionArgs {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub subscription_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub subscription_name: Option<String>,
}

#[mcp_tool(
    name = "azure_set_subscription",
    description = "Set the active Azure subscription by ID or name"
)]
pub async fn set_subscription(
    client: &OpsClient,
    args: SetSubscriptionArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_set_subscription(subscription_id={:?}, subscription_name={:?})",
        args.subscription_id,
        args.subscription_name
    );
    text_result(
        account::set_subscription(
            client,
            args.subscription_id.as_deref(),
            args.subscription_name.as_deref(),
        )
        .await,
    )
}
