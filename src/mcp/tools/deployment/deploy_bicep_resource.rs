use crate::azure::{client::OpsClient, deploy, models::DeploymentParameters};
use crate::mcp::tools::support::text_result;
use serde_json::Value;
use std::collections::BTreeMap;
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct DeployBicepResourceArgs {
    #[serde(default)]
    pub resource_group: String,
    /// Resource type key, e.g. 'storage-account', 'key-vault'
    #[serde(default)]
    pub resource_type: String,
    /// Template parameter values by name
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

#[mcp_tool(
    name = "azure_deploy_bicep_resource",
    description = "Deploy a resource from its Bicep template with fully specified parameters. Call azure_get_bicep_requirements first"
)]
pub async fn deploy_bicep_resource(
    client: &OpsClient,
    args: DeployBicepResourceArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_deploy_bicep_resource(resource_group={}, resource_type={}, parameters={})",
        args.resource_group,
        args.resource_type,
        args.parameters.len()
    );
    let params = DeploymentParameters::from_values(args.parameters);
    text_result(
        deploy::deploy_bicep_resource(client, &args.resource_group, &args.resource_type, params)
            .await,
    )
}
