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
pub struct AttachToNspArgs {
    /// Resource group holding the resource and the perimeter
    #[serde(default)]
    pub resource_group: String,
    /// Perimeter to use when several exist; created as '<resource_group>-nsp' when none does
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub nsp_name: Option<String>,
    /// Full resource ID to attach
    #[serde(default)]
    pub resource_id: String,
}

#[mcp_tool(
    name = "azure_attach_to_nsp",
    description = "Attach a resource to the resource group's Network Security Perimeter, creating the perimeter if needed"
)]
pub async fn attach_to_nsp(
    client: &OpsClient,
    args: AttachToNspArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_attach_to_nsp(resource_group={}, nsp_name={:?}, resource_id={})",
        args.resource_group,
        args.nsp_name,
        args.resource_id
    );
    let run = compliance::attach_to_nsp(
        client,
        &args.resource_group,
        args.nsp_name.as_deref(),
        &args.resource_id,
    )
    .await;
    text_result(run.map(|r| r.render()))
}
