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
pub struct DeployCustomYamlArgs {
    /// Organization name or URL, e.g. 'contoso' or 'https://dev.azure.com/contoso'
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub repo_name: Option<String>,
    /// Target branch
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub branch: Option<String>,
    /// YAML file name; '.yml' is added when there is no extension
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub file_name: Option<String>,
    /// Full YAML content
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub yaml_content: Option<String>,
    /// Folder in the repository (default: pipelines)
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub folder_path: Option<String>,
}

#[mcp_tool(
    name = "ado_deploy_custom_yaml",
    description = "Commit caller-supplied YAML to a folder of an Azure DevOps repository branch"
)]
pub async fn deploy_custom_yaml(
    client: &OpsClient,
    args: DeployCustomYamlArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: ado_deploy_custom_yaml(repo_name={:?}, branch={:?}, file_name={:?})",
        args.repo_name,
        args.branch,
        args.file_name
    );
    let target = RepoTarget {
        organization: args.organization.as_deref(),
        project_name: args.project_name.as_deref(),
        repo_name: args.repo_name.as_deref(),
        branch: args.branch.as_deref(),
    };
    text_result(
        devops::deploy_custom_yaml(
            client,
            target,
            args.file_name.as_deref(),
            args.yaml_content.as_deref(),
            args.folder_path.as_deref(),
        )
        .await,
    )
}
