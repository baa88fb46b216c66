use crate::azure::{client::OpsClient, compliance};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct AttachDiagnosticSettingsArgs {
    /// Resource group holding the resource and the workspace
    #[serde(default)]
    pub resource_group: String,
    /// Log Analytics workspace ID to use when several exist; one is created when none does
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub workspace_id: Option<String>,
    /// Full resource ID to configure
    #[serde(default)]
    pub resource_id: String,
}

#[mcp_tool(
    name = "azure_attach_diagnostic_settings",
    description = "Send a resource's diagnostic logs to the resource group's Log Analytics workspace, creating the workspace if needed"
)]
pub async fn attach_diagnostic_settings(
    client: &OpsClient,
    args: AttachDiagnosticSettingsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_attach_diagnostic_settings(resource_group={}, workspace_id={:?}, resource_id={})",
        args.resource_group,
        args.workspace_id,
        args.resource_id
    );
    let run = compliance::attach_diagnostic_settings(
        client,
        &args.resource_group,
        args.workspace_id.as_deref(),
        &args.resource_id,
    )
    .await;
    text_result(run.map(|r| r.render()))
}
