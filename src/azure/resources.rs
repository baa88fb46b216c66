use crate::azure::client::{OpsClient, OpsError};
use crate::azure::inputs::{present, require_all};
use crate::azure::runner::Execution;
use crate::azure::scripts;
use serde_json::{Value, json};

pub const QUERY_TYPES: &[&str] = &[
    "list_rgs",
    "list_resources",
    "get_resource",
    "find_resource",
    "check_type_in_rg",
    "get_rg_info",
    "custom",
];

pub const TAG_OPERATIONS: &[&str] = &["merge", "replace"];

pub const DEFAULT_MAX_EVENTS: u32 = 50;

/// Principal types accepted for Azure RBAC assignments. Human principals are
/// refused by policy.
const ASSIGNABLE_PRINCIPALS: &[&str] = &["ServicePrincipal", "ManagedIdentity"];
const HUMAN_PRINCIPALS: &[&str] = &["User", "Group"];

fn json_error(message: impl Into<String>) -> OpsError {
    OpsError::Validation(json!({ "error": message.into() }).to_string())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Parses the JSON a CLI call printed. `None` when it did not run cleanly or
/// printed something else.
fn parsed_stdout(execution: &Execution) -> Option<Value> {
    let output = execution.output.as_ref().filter(|o| o.success())?;
    serde_json::from_str(output.stdout.trim()).ok()
}

fn raw_failure(message: &str, execution: &Execution) -> String {
    json!({ "error": message, "raw_output": execution.text }).to_string()
}

pub async fn list_permissions(
    client: &OpsClient,
    user_principal_name: Option<&str>,
) -> Result<String, OpsError> {
    client
        .run_script(
            scripts::LIST_AZURE_PERMISSIONS,
            &[(
                "UserPrincipalName",
                present(user_principal_name).unwrap_or_default().to_string(),
            )],
        )
        .await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceQuery<'a> {
    pub query_type: &'a str,
    pub resource_name: Option<&'a str>,
    pub resource_group: Option<&'a str>,
    pub resource_type: Option<&'a str>,
    pub custom_query: Option<&'a str>,
}

/// Read-only inventory queries through the Azure CLI. Results are JSON text;
/// unparseable CLI output comes back as `{error, raw_output}`.
pub async fn query_resources(client: &OpsClient, query: ResourceQuery<'_>) -> Result<String, OpsError> {
    let query_type = query.query_type.trim().to_lowercase();
    let name = present(query.resource_name);
    let group = present(query.resource_group);
    let resource_type = present(query.resource_type);
    let runner = client.runner();

    match query_type.as_str() {
        "custom" => {
            let Some(custom) = present(query.custom_query) else {
                return Err(json_error("custom_query is required for custom query_type"));
            };
            let execution = runner
                .run_detailed(&["az", "graph", "query", "-q", custom, "-o", "json"])
                .await;
            match parsed_stdout(&execution) {
                Some(data) => {
                    let results = data.get("data").cloned().unwrap_or(data);
                    Ok(pretty(&json!({ "query": custom, "results": results })))
                }
                None if execution.text.to_lowercase().contains("error") => Ok(execution.text),
                None => Ok(raw_failure("Failed to execute custom query", &execution)),
            }
        }
        "list_rgs" => {
            let execution = runner
                .run_detailed(&[
                    "az",
                    "group",
                    "list",
                    "--query",
                    "[].{name:name, location:location, state:properties.provisioningState}",
                    "-o",
                    "json",
                ])
                .await;
            match parsed_stdout(&execution) {
                Some(Value::Array(groups)) => Ok(pretty(&json!({
                    "count": groups.len(),
                    "resourceGroups": groups,
                }))),
                _ => Ok(raw_failure("Failed to parse resource groups", &execution)),
            }
        }
        "list_resources" => {
            let mut command = vec!["az", "resource", "list"];
            if let Some(group) = group {
                command.extend(["-g", group]);
            }
            command.extend([
                "--query",
                "[].{name:name, type:type, location:location, resourceGroup:resourceGroup}",
                "-o",
                "json",
            ]);
            let execution = runner.run_detailed(&command).await;
            let Some(Value::Array(mut resources)) = parsed_stdout(&execution) else {
                return Ok(raw_failure("Failed to parse resources", &execution));
            };
            if let Some(provider) = resource_type
                .and_then(|t| client.catalog().provider_for(&t.to_lowercase()))
            {
                resources.retain(|r| {
                    r.get("type")
                        .and_then(Value::as_str)
                        .is_some_and(|t| t.eq_ignore_ascii_case(provider))
                });
            }
            Ok(pretty(&json!({
                "count": resources.len(),
                "filters": { "resourceGroup": group, "resourceType": resource_type },
                "resources": resources,
            })))
        }
        "get_resource" => {
            let Some(name) = name else {
                return Err(json_error("resource_name is required for get_resource query"));
            };
            let filter = format!("[?name=='{}']", name);
            let mut command = vec!["az", "resource", "list"];
            if let Some(group) = group {
                command.extend(["-g", group]);
            }
            command.extend(["--query", filter.as_str(), "-o", "json"]);
            let execution = runner.run_detailed(&command).await;
            match parsed_stdout(&execution) {
                Some(Value::Array(found)) => match found.into_iter().next() {
                    Some(resource) => Ok(pretty(&json!({ "found": true, "resource": resource }))),
                    None => Ok(json!({
                        "found": false,
                        "message": format!("Resource '{}' not found", name),
                    })
                    .to_string()),
                },
                _ => Ok(raw_failure("Failed to parse resource info", &execution)),
            }
        }
        "find_resource" => {
            let Some(name) = name else {
                return Err(json_error("resource_name is required for find_resource query"));
            };
            let filter = format!(
                "[?name=='{}'].{{name:name, resourceGroup:resourceGroup, type:type}}",
                name
            );
            let execution = runner
                .run_detailed(&["az", "resource", "list", "--query", filter.as_str(), "-o", "json"])
                .await;
            match parsed_stdout(&execution) {
                Some(Value::Array(matches)) if !matches.is_empty() => Ok(pretty(&json!({
                    "found": true,
                    "count": matches.len(),
                    "matches": matches,
                }))),
                Some(Value::Array(_)) => Ok(json!({
                    "found": false,
                    "message": format!("No resource named '{}' found in any resource group", name),
                })
                .to_string()),
                _ => Ok(raw_failure("Failed to search for resource", &execution)),
            }
        }
        "check_type_in_rg" => {
            let (Some(group), Some(resource_type)) = (group, resource_type) else {
                return Err(json_error(
                    "resource_group and resource_type are required for check_type_in_rg query",
                ));
            };
            let Some(provider) = client.catalog().provider_for(&resource_type.to_lowercase()) else {
                return Err(OpsError::Validation(
                    json!({
                        "error": format!("Unknown resource_type: {}", resource_type),
                        "valid_types": client.catalog().lookup_types(),
                    })
                    .to_string(),
                ));
            };
            let execution = runner
                .run_detailed(&[
                    "az",
                    "resource",
                    "list",
                    "-g",
                    group,
                    "--resource-type",
                    provider,
                    "-o",
                    "json",
                ])
                .await;
            let Some(Value::Array(found)) = parsed_stdout(&execution) else {
                return Ok(raw_failure("Failed to check resources", &execution));
            };
            let resources: Vec<Value> = found
                .iter()
                .map(|r| json!({ "name": r.get("name"), "id": r.get("id") }))
                .collect();
            Ok(pretty(&json!({
                "resourceGroup": group,
                "resourceType": resource_type,
                "exists": !resources.is_empty(),
                "count": resources.len(),
                "resources": resources,
            })))
        }
        "get_rg_info" => {
            let Some(group) = group else {
                return Err(json_error("resource_group is required for get_rg_info query"));
            };
            let execution = runner
                .run_detailed(&["az", "group", "show", "-n", group, "-o", "json"])
                .await;
            let Some(info) = parsed_stdout(&execution) else {
                return Ok(raw_failure("Failed to check resources", &execution));
            };
            Ok(pretty(&json!({
                "name": info.get("name"),
                "location": info.get("location"),
                "state": info.pointer("/properties/provisioningState"),
                "tags": info.get("tags").cloned().unwrap_or_else(|| json!({})),
                "id": info.get("id"),
            })))
        }
        other => Err(OpsError::Validation(
            json!({
                "error": format!("Unknown query_type: {}", other),
                "valid_types": QUERY_TYPES,
            })
            .to_string(),
        )),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagUpdate<'a> {
    pub resource_id: Option<&'a str>,
    pub resource_name: Option<&'a str>,
    pub resource_group: Option<&'a str>,
    pub resource_type: Option<&'a str>,
    /// `key1=value1,key2=value2`
    pub tags: Option<&'a str>,
    pub operation: Option<&'a str>,
}

pub async fn update_tags(client: &OpsClient, update: TagUpdate<'_>) -> Result<String, OpsError> {
    let Some(tags) = present(update.tags) else {
        return Err(json_error(
            "tags parameter is required in format 'key1=value1,key2=value2'",
        ));
    };
    let by_id = present(update.resource_id);
    let by_name = present(update.resource_name).zip(present(update.resource_group));
    if by_id.is_none() && by_name.is_none() {
        return Err(json_error(
            "Either resource_id OR (resource_name + resource_group) is required",
        ));
    }

    let operation = present(update.operation).unwrap_or("merge").to_lowercase();
    if !TAG_OPERATIONS.contains(&operation.as_str()) {
        return Err(json_error(format!(
            "Invalid operation '{}'. Use one of: {}",
            operation,
            TAG_OPERATIONS.join(", ")
        )));
    }

    let field = |v: Option<&str>| present(v).unwrap_or_default().to_string();
    client
        .run_script(
            scripts::UPDATE_TAGS,
            &[
                ("Tags", tags.to_string()),
                ("Operation", operation),
                ("ResourceId", field(update.resource_id)),
                ("ResourceName", field(update.resource_name)),
                ("ResourceGroup", field(update.resource_group)),
                ("ResourceType", field(update.resource_type)),
            ],
        )
        .await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityLogQuery<'a> {
    pub resource_group: Option<&'a str>,
    pub resource_id: Option<&'a str>,
    pub resource_name: Option<&'a str>,
    pub days: Option<u32>,
    pub max_events: Option<u32>,
    pub operation_type: Option<&'a str>,
}

/// Options offered when no time range was given.
pub fn activity_log_prompt() -> Value {
    json!({
        "prompt": "How many days of activity logs would you like to retrieve?",
        "options": [
            { "value": 1, "label": "Last 24 hours" },
            { "value": 7, "label": "Last 7 days (recommended)" },
            { "value": 14, "label": "Last 14 days" },
            { "value": 30, "label": "Last 30 days" },
            { "value": 90, "label": "Last 90 days (maximum)" }
        ],
        "default": 7,
        "note": "Larger time ranges may take longer to retrieve"
    })
}

pub async fn get_activity_log(
    client: &OpsClient,
    query: ActivityLogQuery<'_>,
) -> Result<String, OpsError> {
    let Some(days) = query.days else {
        return Ok(activity_log_prompt().to_string());
    };

    let field = |v: Option<&str>| present(v).unwrap_or_default().to_string();
    client
        .run_script(
            scripts::GET_ACTIVITY_LOG,
            &[
                ("Days", days.to_string()),
                (
                    "MaxEvents",
                    query.max_events.unwrap_or(DEFAULT_MAX_EVENTS).to_string(),
                ),
                ("ResourceGroup", field(query.resource_group)),
                ("ResourceId", field(query.resource_id)),
                ("ResourceName", field(query.resource_name)),
                ("OperationType", field(query.operation_type)),
            ],
        )
        .await
}

/// Creates a resource group tagged with its project.
pub async fn create_resource_group(
    client: &OpsClient,
    resource_group_name: Option<&str>,
    region: Option<&str>,
    project_name: Option<&str>,
) -> Result<String, OpsError> {
    let (Some(name), Some(region), Some(project)) = (
        present(resource_group_name),
        present(region),
        present(project_name),
    ) else {
        return Err(OpsError::Validation(
            "Error: All parameters (resource_group_name, region, project_name) are required."
                .to_string(),
        ));
    };

    client
        .run_script(
            scripts::CREATE_RESOURCE_GROUP,
            &[
                ("ResourceGroupName", name.to_string()),
                ("Region", region.to_string()),
                ("ProjectName", project.to_string()),
            ],
        )
        .await
}

fn human_principal_refusal(principal_type: &str) -> OpsError {
    OpsError::Policy(format!(
        "Policy violation: direct Azure RBAC role assignments to principal type '{}' are not allowed.\n\n\
         - For people, request a PIM eligible assignment so access is time-bound and approved.\n\
         - For workloads, assign the role to a managed identity or service principal instead.\n\n\
         Allowed principal types: {}",
        principal_type,
        ASSIGNABLE_PRINCIPALS.join(", ")
    ))
}

/// Creates an Azure RBAC role assignment for a workload identity.
pub async fn assign_role(
    client: &OpsClient,
    principal_id: Option<&str>,
    principal_type: Option<&str>,
    role_name: Option<&str>,
    scope: Option<&str>,
) -> Result<String, OpsError> {
    let requested_type = present(principal_type).unwrap_or_default();
    if HUMAN_PRINCIPALS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(requested_type))
    {
        log::warn!("Refused role assignment to principal type {}", requested_type);
        return Err(human_principal_refusal(requested_type));
    }

    require_all(&[
        (principal_id, "principal_id (object ID of the service principal or managed identity)"),
        (principal_type, "principal_type (ServicePrincipal or ManagedIdentity)"),
        (role_name, "role_name (e.g., 'Reader', 'Storage Blob Data Contributor')"),
        (scope, "scope (resource, resource group or subscription ID)"),
    ])?;

    let Some(allowed) = ASSIGNABLE_PRINCIPALS
        .iter()
        .find(|t| t.eq_ignore_ascii_case(requested_type))
    else {
        return Err(OpsError::Validation(format!(
            "Invalid principal_type: '{}'. Must be one of: {}",
            requested_type,
            ASSIGNABLE_PRINCIPALS.join(", ")
        )));
    };
    // The CLI knows managed identities only as service principals.
    let cli_type = match *allowed {
        "ManagedIdentity" => "ServicePrincipal",
        other => other,
    };

    let command = [
        "az",
        "role",
        "assignment",
        "create",
        "--assignee-object-id",
        present(principal_id).unwrap_or_default(),
        "--assignee-principal-type",
        cli_type,
        "--role",
        present(role_name).unwrap_or_default(),
        "--scope",
        present(scope).unwrap_or_default(),
    ];
    Ok(client.runner().run(&command).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::testing::{Fixture, arg, failed, fixture, ok};

    fn cli(respond: impl Fn(&[String]) -> crate::azure::runner::ProcessOutput + Send + Sync + 'static) -> Fixture {
        fixture(
            &[],
            &[
                scripts::UPDATE_TAGS,
                scripts::GET_ACTIVITY_LOG,
                scripts::CREATE_RESOURCE_GROUP,
            ],
            None,
            move |_, args| respond(args),
        )
    }

    #[tokio::test]
    async fn list_resources_filters_by_provider() {
        let fx = cli(|_| {
            ok(r#"[
                {"name": "kv-app", "type": "Microsoft.KeyVault/vaults", "location": "eastus", "resourceGroup": "rg"},
                {"name": "stapp", "type": "Microsoft.Storage/storageAccounts", "location": "eastus", "resourceGroup": "rg"}
            ]"#)
        });

        let text = query_resources(
            &fx.client,
            ResourceQuery {
                query_type: "list_resources",
                resource_group: Some("rg"),
                resource_type: Some("key-vault"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["resources"][0]["name"], "kv-app");
        assert_eq!(body["filters"]["resourceGroup"], "rg");
        assert_eq!(arg(&fx.all_calls()[0], "-g"), Some("rg"));
    }

    #[tokio::test]
    async fn unparseable_output_is_reported_with_raw_text() {
        let fx = cli(|_| failed("ERROR: (AuthorizationFailed) no access"));

        let text = query_resources(
            &fx.client,
            ResourceQuery {
                query_type: "list_rgs",
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], "Failed to parse resource groups");
        assert!(body["raw_output"].as_str().unwrap().contains("AuthorizationFailed"));
    }

    #[tokio::test]
    async fn missing_name_and_unknown_type_never_run() {
        let fx = cli(|_| ok("[]"));

        let err = query_resources(
            &fx.client,
            ResourceQuery {
                query_type: "get_resource",
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("resource_name is required for get_resource query"));

        let err = query_resources(
            &fx.client,
            ResourceQuery {
                query_type: "everything",
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        let body: Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(body["error"], "Unknown query_type: everything");
        assert_eq!(body["valid_types"].as_array().unwrap().len(), QUERY_TYPES.len());
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn find_resource_reports_absence() {
        let fx = cli(|_| ok("[]"));

        let text = query_resources(
            &fx.client,
            ResourceQuery {
                query_type: "find_resource",
                resource_name: Some("ghost"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["found"], false);
        assert_eq!(body["message"], "No resource named 'ghost' found in any resource group");
    }

    #[tokio::test]
    async fn tags_need_a_target() {
        let fx = cli(|_| ok("done"));

        let err = update_tags(
            &fx.client,
            TagUpdate {
                resource_name: Some("stapp"),
                tags: Some("env=dev"),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Either resource_id OR (resource_name + resource_group)"));

        update_tags(
            &fx.client,
            TagUpdate {
                resource_id: Some("/subscriptions/s/rg/x"),
                tags: Some("env=dev,owner=data"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let call = &fx.calls_to(scripts::UPDATE_TAGS)[0];
        assert_eq!(arg(call, "-Operation"), Some("merge"));
        assert_eq!(arg(call, "-Tags"), Some("env=dev,owner=data"));
        assert_eq!(arg(call, "-ResourceName"), None);
    }

    #[tokio::test]
    async fn activity_log_without_days_asks_for_a_range() {
        let fx = cli(|_| ok("events"));

        let text = get_activity_log(&fx.client, ActivityLogQuery::default())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["default"], 7);
        assert_eq!(body["options"].as_array().unwrap().len(), 5);
        assert!(fx.all_calls().is_empty());

        get_activity_log(
            &fx.client,
            ActivityLogQuery {
                days: Some(14),
                resource_group: Some("rg"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let call = &fx.calls_to(scripts::GET_ACTIVITY_LOG)[0];
        assert_eq!(arg(call, "-Days"), Some("14"));
        assert_eq!(arg(call, "-MaxEvents"), Some("50"));
    }

    #[tokio::test]
    async fn resource_group_needs_every_field() {
        let fx = cli(|_| ok("created"));

        let err = create_resource_group(&fx.client, Some("rg-data"), Some("eastus"), Some(" "))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: All parameters (resource_group_name, region, project_name) are required."
        );

        let text = create_resource_group(&fx.client, Some("rg-data"), Some("eastus"), Some("Data"))
            .await
            .unwrap();
        assert_eq!(text, "created");
    }

    #[tokio::test]
    async fn human_principals_are_refused_before_any_command() {
        let fx = cli(|_| ok("{}"));

        for principal_type in ["User", "group"] {
            let err = assign_role(
                &fx.client,
                Some("oid"),
                Some(principal_type),
                Some("Reader"),
                Some("/subscriptions/s"),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, OpsError::Policy(_)));
            assert!(err.to_string().contains("PIM eligible assignment"));
        }
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn managed_identity_is_assigned_as_service_principal() {
        let fx = cli(|_| ok("{\"roleDefinitionName\": \"Reader\"}"));

        assign_role(
            &fx.client,
            Some("oid-1"),
            Some("ManagedIdentity"),
            Some("Reader"),
            Some("/subscriptions/s/resourceGroups/rg"),
        )
        .await
        .unwrap();

        let call = &fx.all_calls()[0];
        assert_eq!(call[..4], ["az", "role", "assignment", "create"]);
        assert_eq!(arg(call, "--assignee-principal-type"), Some("ServicePrincipal"));
        assert_eq!(arg(call, "--assignee-object-id"), Some("oid-1"));
    }
}
