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
pub struct GetCurrentUserArgs {}

#[mcp_tool(
    name = "get_current_user",
    description = "Get the current Azure subscription, tenant and signed-in user email"
)]
pub async fn get_current_user(
    client: &OpsClient,
    _args: GetCurrentUserArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: get_current_user");
    text_result(account::get_current_user(client).await)
}
