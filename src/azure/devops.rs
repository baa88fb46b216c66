use crate::azure::client::{OpsClient, OpsError};
use crate::azure::inputs::{RequiredInputs, normalize_organization, present, require_all};
use crate::azure::scripts;

const DEFAULT_PIPELINE_FOLDER: &str = "pipelines";
const FALLBACK_PIPELINE_TYPE: &str = "credscan";

/// Pipeline template keys and their YAML files.
pub const PIPELINE_TEMPLATES: &[(&str, &str)] = &[
    ("credscan", "templates/credscan_Pipeline.yml"),
    ("credscan-1es", "templates/credscan_1ES_Pipeline.yml"),
];

// First keyword found in the name wins.
const PIPELINE_KEYWORDS: &[(&str, &str)] = &[
    ("1es", "credscan-1es"),
    ("prod", "credscan-1es"),
    ("production", "credscan-1es"),
    ("credscan", "credscan"),
];

fn template_for(pipeline_type: &str) -> Option<&'static str> {
    PIPELINE_TEMPLATES
        .iter()
        .find(|(key, _)| *key == pipeline_type)
        .map(|(_, path)| *path)
}

fn template_keys() -> Vec<&'static str> {
    let mut keys: Vec<_> = PIPELINE_TEMPLATES.iter().map(|(k, _)| *k).collect();
    keys.sort_unstable();
    keys
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Picks a pipeline template key from a pipeline name plus free-form hint:
/// keywords first, then the normalized name, then a substring match, falling
/// back to `credscan`.
pub fn detect_pipeline_type(pipeline_name: &str, hint: &str) -> &'static str {
    let combined = format!("{} {}", pipeline_name, hint).to_lowercase();
    for (keyword, pipeline_type) in PIPELINE_KEYWORDS {
        if combined.contains(keyword) && template_for(pipeline_type).is_some() {
            return *pipeline_type;
        }
    }

    let normalized = pipeline_name.to_lowercase().replace(['_', ' '], "-");
    if let Some((key, _)) = PIPELINE_TEMPLATES.iter().find(|(k, _)| *k == normalized) {
        return *key;
    }
    PIPELINE_TEMPLATES
        .iter()
        .find(|(key, _)| normalized.contains(key) || key.contains(normalized.as_str()))
        .map(|(key, _)| *key)
        .unwrap_or(FALLBACK_PIPELINE_TYPE)
}

fn ensure_yaml_extension(name: &str) -> String {
    if name.ends_with(".yml") || name.ends_with(".yaml") {
        name.to_string()
    } else {
        format!("{}.yml", name)
    }
}

fn strip_yaml_extension(name: &str) -> &str {
    name.strip_suffix(".yml")
        .or_else(|| name.strip_suffix(".yaml"))
        .unwrap_or(name)
}

fn organization_of(organization: Option<&str>) -> Option<String> {
    present(organization).map(normalize_organization)
}

pub async fn create_project(
    client: &OpsClient,
    organization: Option<&str>,
    project_name: Option<&str>,
    repo_name: Option<&str>,
    description: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("ADO Project Creation")
        .require(
            organization,
            "organization (existing org URL where you're admin, e.g., https://dev.azure.com/<org>)",
        )
        .require(project_name, "project_name (name to keep/create)")
        .require(repo_name, "repo_name (initial repo name)")
        .footer("Only required inputs: organization, project_name, repo_name.")
        .finish()?;

    client
        .run_script(
            scripts::CREATE_DEVOPS_PROJECT,
            &[
                ("Organization", organization_of(organization).unwrap_or_default()),
                ("ProjectName", present(project_name).unwrap_or_default().to_string()),
                ("RepoName", present(repo_name).unwrap_or_default().to_string()),
                ("Description", present(description).unwrap_or_default().to_string()),
            ],
        )
        .await
}

pub async fn create_repo(
    client: &OpsClient,
    organization: Option<&str>,
    project_name: Option<&str>,
    repo_name: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("ADO Repo Creation")
        .require(
            organization,
            "organization (existing org URL where you're project admin)",
        )
        .require(project_name, "project_name (existing project)")
        .require(repo_name, "repo_name (new repo name to keep/create)")
        .footer("Only required inputs: organization, project_name, repo_name.")
        .finish()?;

    client
        .run_script(
            scripts::CREATE_DEVOPS_REPO,
            &[
                ("Organization", organization_of(organization).unwrap_or_default()),
                ("ProjectName", present(project_name).unwrap_or_default().to_string()),
                ("RepoName", present(repo_name).unwrap_or_default().to_string()),
            ],
        )
        .await
}

pub async fn list_projects(
    client: &OpsClient,
    organization: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("ADO List Projects")
        .require(organization, "organization (org URL to list projects from)")
        .footer("Only required input: organization.")
        .finish()?;

    client
        .run_script(
            scripts::LIST_DEVOPS_PROJECTS,
            &[("Organization", organization_of(organization).unwrap_or_default())],
        )
        .await
}

pub async fn list_repos(
    client: &OpsClient,
    organization: Option<&str>,
    project_name: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("ADO List Repositories")
        .require(organization, "organization (org URL)")
        .require(project_name, "project_name (project to list repos from)")
        .footer("Only required inputs: organization, project_name.")
        .finish()?;

    client
        .run_script(
            scripts::LIST_DEVOPS_REPOS,
            &[
                ("Organization", organization_of(organization).unwrap_or_default()),
                ("ProjectName", present(project_name).unwrap_or_default().to_string()),
            ],
        )
        .await
}

pub async fn create_branch(
    client: &OpsClient,
    organization: Option<&str>,
    project_name: Option<&str>,
    repo_name: Option<&str>,
    branch_name: Option<&str>,
    base_branch: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("ADO Create Branch")
        .require(organization, "organization (org URL)")
        .require(project_name, "project_name (existing project)")
        .require(repo_name, "repo_name (existing repo)")
        .require(
            branch_name,
            "branch_name (new branch name, e.g., 'dev' or 'feature/myfeature')",
        )
        .require(
            base_branch,
            "base_branch (branch to create from, usually 'main')",
        )
        .footer(
            "Only required inputs: organization, project_name, repo_name, branch_name, base_branch.",
        )
        .finish()?;

    client
        .run_script(
            scripts::CREATE_DEVOPS_BRANCH,
            &[
                ("Organization", organization_of(organization).unwrap_or_default()),
                ("ProjectName", present(project_name).unwrap_or_default().to_string()),
                ("RepoName", present(repo_name).unwrap_or_default().to_string()),
                ("BranchName", present(branch_name).unwrap_or_default().to_string()),
                ("BaseBranch", present(base_branch).unwrap_or_default().to_string()),
            ],
        )
        .await
}

/// Target repository location shared by the YAML and pipeline operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoTarget<'a> {
    pub organization: Option<&'a str>,
    pub project_name: Option<&'a str>,
    pub repo_name: Option<&'a str>,
    pub branch: Option<&'a str>,
}

impl<'a> RepoTarget<'a> {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Organization", organization_of(self.organization).unwrap_or_default()),
            ("ProjectName", present(self.project_name).unwrap_or_default().to_string()),
            ("RepoName", present(self.repo_name).unwrap_or_default().to_string()),
        ]
    }

    fn branch(&self) -> String {
        present(self.branch).unwrap_or_default().to_string()
    }
}

/// Commits caller-supplied YAML to `<folder>/<file_name>` in the repository.
pub async fn deploy_custom_yaml(
    client: &OpsClient,
    target: RepoTarget<'_>,
    file_name: Option<&str>,
    yaml_content: Option<&str>,
    folder_path: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("Deploy Custom YAML - Missing Required Parameters")
        .require(target.organization, "organization (Azure DevOps org URL)")
        .require(target.project_name, "project_name (existing project)")
        .require(target.repo_name, "repo_name (existing repo)")
        .require(target.branch, "branch (target branch, e.g., 'main', 'dev')")
        .require(
            file_name,
            "file_name (display name for YAML, e.g., 'sourcebranchvalidation.yml')",
        )
        .require(
            yaml_content,
            "yaml_content (the actual YAML content to deploy)",
        )
        .footer(
            "Example usage:\n  organization: 'https://dev.azure.com/myorg'\n  project_name: 'MyProject'\n  repo_name: 'MyRepo'\n  branch: 'dev'\n  file_name: 'my-pipeline.yml'\n  yaml_content: '<paste your YAML content>'",
        )
        .finish()?;

    let file_name = ensure_yaml_extension(present(file_name).unwrap_or_default());
    let mut params = target.params();
    params.extend([
        ("TemplateName", strip_yaml_extension(&file_name).to_string()),
        ("Branch", target.branch()),
        (
            "FolderPath",
            present(folder_path).unwrap_or(DEFAULT_PIPELINE_FOLDER).to_string(),
        ),
        ("CustomYamlContent", yaml_content.unwrap_or_default().to_string()),
        ("YamlFileName", file_name.clone()),
    ]);

    log::info!("Deploying custom YAML {}", file_name);
    client.run_script(scripts::DEPLOY_PIPELINE_YAML, &params).await
}

/// Commits a built-in pipeline template, or custom YAML when given, to the
/// repository.
pub async fn deploy_pipeline_yaml(
    client: &OpsClient,
    target: RepoTarget<'_>,
    pipeline_type: Option<&str>,
    folder_path: Option<&str>,
    custom_yaml_content: Option<&str>,
    yaml_file_name: Option<&str>,
) -> Result<String, OpsError> {
    RequiredInputs::new("Deploy Pipeline YAML")
        .require(target.organization, "organization (org URL)")
        .require(target.project_name, "project_name (existing project)")
        .require(target.repo_name, "repo_name (existing repo)")
        .require(
            pipeline_type,
            "pipeline_type (template key like 'credscan', 'credscan-1es', or name for custom)",
        )
        .require(target.branch, "branch (target branch, usually 'main')")
        .footer(format!(
            "Available templates: {}\n\nOptional: folder_path (defaults to 'pipelines'), custom_yaml_content, yaml_file_name",
            template_keys().join(", ")
        ))
        .finish()?;

    let pipeline_type = present(pipeline_type).unwrap_or_default();
    let folder = present(folder_path).unwrap_or(DEFAULT_PIPELINE_FOLDER).to_string();
    let mut params = target.params();

    match present(custom_yaml_content) {
        Some(content) => {
            let yaml_name = ensure_yaml_extension(
                &present(yaml_file_name)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}.yml", pipeline_type)),
            );
            params.extend([
                ("TemplateName", strip_yaml_extension(&yaml_name).to_string()),
                ("Branch", target.branch()),
                ("FolderPath", folder),
                ("CustomYamlContent", content.to_string()),
                ("YamlFileName", yaml_name),
            ]);
        }
        None => {
            let detected = detect_pipeline_type(pipeline_type, pipeline_type);
            let template = template_for(detected).unwrap_or_default();
            log::info!("Deploying pipeline template {} ({})", detected, template);
            params.extend([
                ("TemplateName", strip_yaml_extension(basename(template)).to_string()),
                ("Branch", target.branch()),
                ("FolderPath", folder),
            ]);
        }
    }

    client.run_script(scripts::DEPLOY_PIPELINE_YAML, &params).await
}

/// Creates a pipeline definition over a YAML file already in the repository.
pub async fn create_pipeline(
    client: &OpsClient,
    target: RepoTarget<'_>,
    pipeline_name: Option<&str>,
    pipeline_type: Option<&str>,
    yaml_path: Option<&str>,
) -> Result<String, OpsError> {
    let pipeline_type = match (present(pipeline_type), present(pipeline_name)) {
        (Some(explicit), _) => explicit.to_string(),
        (None, Some(name)) => detect_pipeline_type(name, "").to_string(),
        (None, None) => FALLBACK_PIPELINE_TYPE.to_string(),
    };

    let kind = if pipeline_type.contains("1es") || pipeline_type.contains("prod") {
        "This is a PRODUCTION pipeline (1ES template with pool parameters required)"
    } else {
        "This is a standard pipeline template"
    };
    RequiredInputs::new("Create Azure DevOps Pipeline")
        .require(target.organization, "organization (org URL)")
        .require(target.project_name, "project_name (existing project)")
        .require(target.repo_name, "repo_name (existing repo)")
        .require(
            pipeline_name,
            "pipeline_name (include '1ES' or 'prod' for production pipelines)",
        )
        .require(target.branch, "branch (branch with YAML, usually 'main')")
        .footer(format!(
            "Detected pipeline type: {}\n{}\n\nAvailable templates (auto-discovered): {}",
            pipeline_type,
            kind,
            template_keys().join(", ")
        ))
        .finish()?;

    let template = template_for(&pipeline_type)
        .or_else(|| template_keys().first().and_then(|k| template_for(k)))
        .unwrap_or("pipeline.yml");
    let yaml_path = present(yaml_path)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/{}", DEFAULT_PIPELINE_FOLDER, basename(template)));

    let mut params = target.params();
    params.extend([
        ("PipelineName", present(pipeline_name).unwrap_or_default().to_string()),
        ("Branch", target.branch()),
        ("YamlPath", yaml_path),
    ]);
    client.run_script(scripts::CREATE_DEVOPS_PIPELINE, &params).await
}

/// Adds a principal to a project security group.
pub async fn assign_role(
    client: &OpsClient,
    organization: Option<&str>,
    project_name: Option<&str>,
    role_name: Option<&str>,
    principal_id: Option<&str>,
) -> Result<String, OpsError> {
    require_all(&[
        (organization, "organization (Azure DevOps org URL or name)"),
        (project_name, "project_name (name of the ADO project)"),
        (
            role_name,
            "role_name (e.g., 'Project Administrators', 'Contributors', 'Readers')",
        ),
        (
            principal_id,
            "principal_id (Object ID / GUID of the user, group, or service principal)",
        ),
    ])?;

    client
        .run_script(
            scripts::ASSIGN_ADO_ROLE,
            &[
                ("Organization", organization_of(organization).unwrap_or_default()),
                ("ProjectName", present(project_name).unwrap_or_default().to_string()),
                ("RoleName", present(role_name).unwrap_or_default().to_string()),
                ("PrincipalId", present(principal_id).unwrap_or_default().to_string()),
            ],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::testing::{Fixture, arg, fixture, ok};

    fn devops_fixture() -> Fixture {
        fixture(
            &[],
            &[
                scripts::CREATE_DEVOPS_PROJECT,
                scripts::CREATE_DEVOPS_REPO,
                scripts::LIST_DEVOPS_PROJECTS,
                scripts::DEPLOY_PIPELINE_YAML,
                scripts::CREATE_DEVOPS_PIPELINE,
                scripts::ASSIGN_ADO_ROLE,
            ],
            None,
            |_, _| ok("done"),
        )
    }

    fn target<'a>() -> RepoTarget<'a> {
        RepoTarget {
            organization: Some("contoso"),
            project_name: Some("Payments"),
            repo_name: Some("api"),
            branch: Some("main"),
        }
    }

    #[test]
    fn pipeline_type_detection() {
        assert_eq!(detect_pipeline_type("CredScan-1ES-Prod", ""), "credscan-1es");
        assert_eq!(detect_pipeline_type("payments production", ""), "credscan-1es");
        assert_eq!(detect_pipeline_type("credscan nightly", ""), "credscan");
        assert_eq!(detect_pipeline_type("credscan_1es", ""), "credscan-1es");
        assert_eq!(detect_pipeline_type("lint", ""), "credscan");
    }

    #[test]
    fn yaml_names() {
        assert_eq!(ensure_yaml_extension("build"), "build.yml");
        assert_eq!(ensure_yaml_extension("build.yaml"), "build.yaml");
        assert_eq!(strip_yaml_extension("build.yaml"), "build");
        assert_eq!(strip_yaml_extension("build.yml"), "build");
    }

    #[tokio::test]
    async fn create_project_normalizes_organization() {
        let fx = devops_fixture();

        create_project(&fx.client, Some("contoso"), Some("Payments"), Some("api"), None)
            .await
            .unwrap();

        let call = &fx.calls_to(scripts::CREATE_DEVOPS_PROJECT)[0];
        assert_eq!(arg(call, "-Organization"), Some("https://dev.azure.com/contoso"));
        assert_eq!(arg(call, "-Description"), None);
    }

    #[tokio::test]
    async fn missing_inputs_are_listed_before_running_anything() {
        let fx = devops_fixture();

        let err = create_repo(&fx.client, Some("contoso"), None, Some(" "))
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.starts_with("ADO Repo Creation\n\nPlease provide:\n"));
        assert!(text.contains("  - project_name (existing project)"));
        assert!(text.contains("  - repo_name (new repo name to keep/create)"));
        assert!(!text.contains("  - organization"));
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn template_deploy_uses_detected_template_name() {
        let fx = devops_fixture();

        deploy_pipeline_yaml(&fx.client, target(), Some("prod scan"), None, None, None)
            .await
            .unwrap();

        let call = &fx.calls_to(scripts::DEPLOY_PIPELINE_YAML)[0];
        assert_eq!(arg(call, "-TemplateName"), Some("credscan_1ES_Pipeline"));
        assert_eq!(arg(call, "-FolderPath"), Some("pipelines"));
        assert_eq!(arg(call, "-CustomYamlContent"), None);
    }

    #[tokio::test]
    async fn custom_yaml_gets_an_extension() {
        let fx = devops_fixture();

        deploy_custom_yaml(
            &fx.client,
            target(),
            Some("validation"),
            Some("trigger: none\n"),
            Some("ci"),
        )
        .await
        .unwrap();

        let call = &fx.calls_to(scripts::DEPLOY_PIPELINE_YAML)[0];
        assert_eq!(arg(call, "-YamlFileName"), Some("validation.yml"));
        assert_eq!(arg(call, "-TemplateName"), Some("validation"));
        assert_eq!(arg(call, "-FolderPath"), Some("ci"));
    }

    #[tokio::test]
    async fn pipeline_yaml_path_defaults_to_template_file() {
        let fx = devops_fixture();

        create_pipeline(&fx.client, target(), Some("Payments-1ES"), None, None)
            .await
            .unwrap();

        let call = &fx.calls_to(scripts::CREATE_DEVOPS_PIPELINE)[0];
        assert_eq!(
            arg(call, "-YamlPath"),
            Some("pipelines/credscan_1ES_Pipeline.yml")
        );
    }

    #[tokio::test]
    async fn pipeline_prompt_names_the_detected_type() {
        let fx = devops_fixture();
        let partial = RepoTarget {
            branch: None,
            ..target()
        };

        let err = create_pipeline(&fx.client, partial, Some("nightly-prod"), None, None)
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("Detected pipeline type: credscan-1es"));
        assert!(text.contains("This is a PRODUCTION pipeline"));
    }

    #[tokio::test]
    async fn role_assignment_lists_missing_parameters() {
        let fx = devops_fixture();

        let err = assign_role(&fx.client, Some("contoso"), Some("Payments"), None, None)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required parameters:\n  - role_name (e.g., 'Project Administrators', 'Contributors', 'Readers')\n  - principal_id (Object ID / GUID of the user, group, or service principal)"
        );
    }
}
