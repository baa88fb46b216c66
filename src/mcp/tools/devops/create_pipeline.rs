use crate::azure::{
    client::OpsClient,
    devops::{self, RepoTarget},
};
use crate::mcp::tools::support::{deserialize_blank_as_none, text_result};
use mcp_tools_codegen::mcp_tool;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct CreatePipelineArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub pipeline_name: Option<String>,
    /// Target branch
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub branch: Option<String>,
    /// Template: 'credscan' or 'credscan-1es'. Detected from the name when omitted
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub pipeline_type: Option<String>,
    /// Path of the pipeline YAML in the repository
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub yaml_path: Option<String>,
}

#[mcp_tool(
    name = "ado_create_pipeline",
    description = "Create an Azure DevOps pipeline from a YAML file in a repository"
)]
pub async fn create_pipeline(
    client: &OpsClient,
    args: CreatePipelineArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_create_pipeline(repo_name={:?}, pipeline_name={:?}, branch={:?})",
        args.repo_name,
        args.pipeline_name,
        args.branch
    );
    let target = RepoTarget {
        organization: args.organization.as_deref(),
        project_name: args.project_name.as_deref(),
        repo_name: args.repo_name.as_deref(),
        branch: args.branch.as_deref(),
    };
    text_result(
        devops::create_pipeline(
            client,
            target,
            args.pipeline_name.as_deref(),
            args.pipeline_type.as_deref(),
            args.yaml_path.as_deref(),
        )
        .await,
    )
}
