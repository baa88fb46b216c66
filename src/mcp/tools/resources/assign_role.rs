use crate::azure::{client::OpsClient, resources};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct AssignRoleArgs {
    /// Object ID of the service principal or managed identity
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub principal_id: Option<String>,
    /// ServicePrincipal or ManagedIdentity. User and Group are refused.
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub principal_type: Option<String>,
    /// Role name, e.g. 'Reader'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub role_name: Option<String>,
    /// Scope: resource, resource group or subscription ID
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub scope: Option<String>,
}

#[mcp_tool(
    name = "azure_assign_role",
    description = "Assign an Azure RBAC role to a service principal or managed identity. Users and groups must use PIM"
)]
pub async fn assign_role(
    client: &OpsClient,
    args: AssignRoleArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azure_assign_role(principal_type={:?}, role_name={:?}, scope={:?})",
        args.principal_type,
        args.role_name,
        args.scope
    );
    text_result(
        resources::assign_role(
            client,
            args.principal_id.as_deref(),
            args.principal_type.as_deref(),
            args.role_name.as_deref(),
            args.scope.as_deref(),
        )
        .await,
    )
}
