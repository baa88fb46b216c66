use crate::azure::client::{OpsClient, OpsError};
use crate::azure::inputs::{normalize_organization, present, require_all};
use crate::azure::scripts;

pub const WORKSPACE_ROLES: &[&str] = &["Admin", "Contributor", "Member", "Viewer"];
pub const PRINCIPAL_TYPES: &[&str] = &["User", "Group", "ServicePrincipal", "ServicePrincipalProfile"];

const DEFAULT_GIT_DIRECTORY: &str = "/";

fn value(input: Option<&str>) -> String {
    present(input).unwrap_or_default().to_string()
}

/// `{"error": "..."}` as a validation error, the shape the managed private
/// endpoint tools report.
fn json_error(message: &str) -> OpsError {
    OpsError::Validation(serde_json::json!({ "error": message }).to_string())
}

fn one_of(field: &str, raw: &str, allowed: &[&str]) -> Result<(), OpsError> {
    if allowed.contains(&raw) {
        Ok(())
    } else {
        Err(OpsError::Validation(format!(
            "Invalid {}: '{}'. Must be one of: {}",
            field,
            raw,
            allowed.join(", ")
        )))
    }
}

pub async fn list_permissions(
    client: &OpsClient,
    user_principal_name: Option<&str>,
) -> Result<String, OpsError> {
    client
        .run_script(
            scripts::LIST_FABRIC_PERMISSIONS,
            &[("UserPrincipalName", value(user_principal_name))],
        )
        .await
}

/// Managed private endpoint from a Fabric workspace to an Azure resource.
pub async fn create_managed_private_endpoint(
    client: &OpsClient,
    workspace_id: Option<&str>,
    endpoint_name: Option<&str>,
    target_resource_id: Option<&str>,
    group_id: Option<&str>,
) -> Result<String, OpsError> {
    let checks = [
        (workspace_id, "workspace_id is required"),
        (endpoint_name, "endpoint_name is required"),
        (target_resource_id, "target_resource_id is required"),
        (
            group_id,
            "group_id is required (e.g., 'blob', 'dfs', 'vault', 'sqlServer')",
        ),
    ];
    if let Some((_, message)) = checks.iter().find(|(v, _)| present(*v).is_none()) {
        return Err(json_error(message));
    }

    client
        .run_script(
            scripts::CREATE_FABRIC_MANAGED_PE,
            &[
                ("WorkspaceId", value(workspace_id)),
                ("EndpointName", value(endpoint_name)),
                ("TargetResourceId", value(target_resource_id)),
                ("GroupId", value(group_id)),
            ],
        )
        .await
}

pub async fn list_managed_private_endpoints(
    client: &OpsClient,
    workspace_id: Option<&str>,
) -> Result<String, OpsError> {
    if present(workspace_id).is_none() {
        return Err(json_error("workspace_id is required"));
    }
    client
        .run_script(
            scripts::LIST_FABRIC_MANAGED_PE,
            &[("WorkspaceId", value(workspace_id))],
        )
        .await
}

pub async fn create_workspace(
    client: &OpsClient,
    capacity_id: Option<&str>,
    workspace_name: Option<&str>,
    description: Option<&str>,
) -> Result<String, OpsError> {
    require_all(&[
        (capacity_id, "capacity_id (full resource ID)"),
        (workspace_name, "workspace_name"),
    ])?;

    client
        .run_script(
            scripts::CREATE_FABRIC_WORKSPACE,
            &[
                ("CapacityId", value(capacity_id)),
                ("WorkspaceName", value(workspace_name)),
                ("Description", value(description)),
            ],
        )
        .await
}

/// Connects a workspace to an Azure DevOps repository branch.
pub async fn attach_workspace_to_git(
    client: &OpsClient,
    workspace_id: Option<&str>,
    organization: Option<&str>,
    project_name: Option<&str>,
    repo_name: Option<&str>,
    branch_name: Option<&str>,
    directory_name: Option<&str>,
) -> Result<String, OpsError> {
    require_all(&[
        (workspace_id, "workspace_id"),
        (organization, "organization"),
        (project_name, "project_name"),
        (repo_name, "repo_name"),
        (branch_name, "branch_name"),
    ])?;

    client
        .run_script(
            scripts::ATTACH_FABRIC_GIT,
            &[
                ("WorkspaceId", value(workspace_id)),
                (
                    "Organization",
                    normalize_organization(present(organization).unwrap_or_default()),
                ),
                ("ProjectName", value(project_name)),
                ("RepoName", value(repo_name)),
                ("BranchName", value(branch_name)),
                (
                    "DirectoryName",
                    present(directory_name)
                        .unwrap_or(DEFAULT_GIT_DIRECTORY)
                        .to_string(),
                ),
            ],
        )
        .await
}

/// Workspace role assignment. Role and principal type are checked against
/// the values the Fabric API accepts before anything runs.
pub async fn assign_role(
    client: &OpsClient,
    workspace_identifier: Option<&str>,
    role_name: Option<&str>,
    principal_id: Option<&str>,
    principal_type: Option<&str>,
) -> Result<String, OpsError> {
    require_all(&[
        (
            workspace_identifier,
            "workspace_identifier (workspace name or workspace ID)",
        ),
        (role_name, "role_name (Admin, Contributor, Member, Viewer)"),
        (
            principal_id,
            "principal_id (Object ID / Principal ID of the user, group, SPN, or managed identity)",
        ),
        (
            principal_type,
            "principal_type (User, Group, ServicePrincipal, ServicePrincipalProfile)",
        ),
    ])?;

    let role_name = value(role_name);
    let principal_type = value(principal_type);
    one_of("role_name", &role_name, WORKSPACE_ROLES)?;
    one_of("principal_type", &principal_type, PRINCIPAL_TYPES)?;

    client
        .run_script(
            scripts::ASSIGN_FABRIC_ROLE,
            &[
                ("WorkspaceIdentifier", value(workspace_identifier)),
                ("RoleName", role_name),
                ("PrincipalId", value(principal_id)),
                ("PrincipalType", principal_type),
            ],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::testing::{Fixture, arg, fixture, ok};

    fn fabric_fixture() -> Fixture {
        fixture(
            &[],
            &[
                scripts::LIST_FABRIC_PERMISSIONS,
                scripts::CREATE_FABRIC_MANAGED_PE,
                scripts::ATTACH_FABRIC_GIT,
                scripts::ASSIGN_FABRIC_ROLE,
            ],
            None,
            |_, _| ok("{\"status\": \"ok\"}"),
        )
    }

    #[tokio::test]
    async fn managed_endpoint_reports_first_missing_field_as_json() {
        let fx = fabric_fixture();

        let err = create_managed_private_endpoint(
            &fx.client,
            Some("ws-1"),
            Some("pe-kv"),
            Some("/subscriptions/s/vaults/kv"),
            None,
        )
        .await
        .unwrap_err();

        let body: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(
            body["error"],
            "group_id is required (e.g., 'blob', 'dfs', 'vault', 'sqlServer')"
        );
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn git_attach_defaults_directory_and_normalizes_org() {
        let fx = fabric_fixture();

        attach_workspace_to_git(
            &fx.client,
            Some("ws-1"),
            Some("contoso"),
            Some("Data"),
            Some("fabric"),
            Some("main"),
            None,
        )
        .await
        .unwrap();

        let call = &fx.calls_to(scripts::ATTACH_FABRIC_GIT)[0];
        assert_eq!(arg(call, "-Organization"), Some("https://dev.azure.com/contoso"));
        assert_eq!(arg(call, "-DirectoryName"), Some("/"));
    }

    #[tokio::test]
    async fn role_and_principal_type_are_validated_first() {
        let fx = fabric_fixture();

        let err = assign_role(&fx.client, Some("ws"), Some("Owner"), Some("oid"), Some("User"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid role_name: 'Owner'. Must be one of: Admin, Contributor, Member, Viewer"
        );

        let err = assign_role(&fx.client, Some("ws"), Some("Viewer"), Some("oid"), Some("Robot"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid principal_type: 'Robot'"));
        assert!(fx.all_calls().is_empty());

        assign_role(&fx.client, Some("ws"), Some("Viewer"), Some("oid"), Some("Group"))
            .await
            .unwrap();
        assert_eq!(fx.calls_to(scripts::ASSIGN_FABRIC_ROLE).len(), 1);
    }

    #[tokio::test]
    async fn optional_principal_name_is_omitted() {
        let fx = fabric_fixture();

        list_permissions(&fx.client, None).await.unwrap();

        let call = &fx.calls_to(scripts::LIST_FABRIC_PERMISSIONS)[0];
        assert_eq!(arg(call, "-UserPrincipalName"), None);
    }
}
