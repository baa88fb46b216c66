use crate::azure::{client::OpsClient, compliance};
use crate::mcp::tools::support::{deserialize_non_empty_string, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ConfirmComplianceArgs {
    /// Token from the deployment response
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub token: String,
    /// true runs the step, false skips it
    pub confirm: bool,
}

#[mcp_tool(
    name = "azure_confirm_compliance",
    description = "Answer a compliance prompt from a deployment: run or skip the NSP attachment or Log Analytics configuration it names"
)]
pub async fn confirm_compliance(
    client: &OpsClient,
    args: ConfirmComplianceArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_confirm_compliance(confirm={})",
        args.confirm
    );
    text_result(compliance::confirm(client, &args.token, args.confirm).await)
}
