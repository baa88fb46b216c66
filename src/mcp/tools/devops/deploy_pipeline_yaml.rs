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
pub struct DeployPipelineYamlArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    /// Template: 'credscan' or 'credscan-1es'. Detected from the name when omitted
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub pipeline_type: Option<String>,
    /// Target branch
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub branch: Option<String>,
    /// Folder in the repository (default: pipelines)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub folder_path: Option<String>,
    /// YAML to deploy instead of a template
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub custom_yaml_content: Option<String>,
    /// File name for the deployed YAML
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub yaml_file_name: Option<String>,
}

#[mcp_tool(
    name = "ado_deploy_pipeline_yaml",
    description = "Commit a pipeline YAML template (credscan, credscan-1es) or custom YAML to an Azure DevOps repository"
)]
pub async fn deploy_pipeline_yaml(
    client: &OpsClient,
    args: DeployPipelineYamlArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_deploy_pipeline_yaml(repo_name={:?}, pipeline_type={:?}, branch={:?})",
        args.repo_name,
        args.pipeline_type,
        args.branch
    );
    let target = RepoTarget {
        organization: args.organization.as_deref(),
        project_name: args.project_name.as_deref(),
        repo_name: args.repo_name.as_deref(),
        branch: args.branch.as_deref(),
    };
    text_result(
        devops::deploy_pipeline_yaml(
            client,
            target,
            args.pipeline_type.as_deref(),
            args.folder_path.as_deref(),
            args.custom_yaml_content.as_deref(),
            args.yaml_file_name.as_deref(),
        )
        .await,
    )
}
