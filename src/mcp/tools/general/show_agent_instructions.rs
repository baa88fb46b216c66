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
pub struct ShowAgentInstructionsArgs {}

#[mcp_tool(
    name = "show_agent_instructions",
    description = "Show the agent instructions: capabilities, supported resources and operational guidelines"
)]
pub async fn show_agent_instructions(
    client: &OpsClient,
    _args: ShowAgentInstructionsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: show_agent_instructions");
    text_result(Ok(account::show_agent_instructions(client).await))
}
